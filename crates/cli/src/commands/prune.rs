// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hourly prune`: apply log retention on demand.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;
use clap::Args;
use hourly_core::{RunnerConfig, EXIT_IO};
use hourly_runner::retention::{self, RetentionReport};
use hourly_runner::RunLock;

use crate::exit_error::ExitError;
use crate::output::{print_prune_results, OutputFormat};

#[derive(Args)]
pub struct PruneArgs {
    /// Show what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

fn dry_run(config: &RunnerConfig) -> Result<(Vec<PathBuf>, usize)> {
    let plan = retention::plan(&config.layout, config.retention, None, SystemTime::now())
        .map_err(|e| {
            ExitError::new(
                EXIT_IO,
                format!("failed to list {}: {}", config.layout.dir().display(), e),
            )
        })?;
    let delete = plan.delete.into_iter().map(|f| f.path).collect();
    Ok((delete, plan.keep.len()))
}

fn prune(config: &RunnerConfig) -> Result<RetentionReport> {
    let lock_path = config.layout.lock_path();
    let lock = RunLock::try_acquire(&lock_path).map_err(|e| {
        ExitError::new(
            EXIT_IO,
            format!("failed to acquire run lock {}: {}", lock_path.display(), e),
        )
    })?;
    // A run in progress prunes when it finishes.
    let Some(_lock) = lock else {
        return Err(ExitError::new(1, "a run is in progress; try again when it finishes").into());
    };
    Ok(retention::enforce(&config.layout, config.retention, None))
}

pub fn handle(args: PruneArgs, config_flag: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = super::load_config(config_flag)?;

    let (entries, kept, failed) = if args.dry_run {
        let (delete, kept) = dry_run(&config)?;
        (delete, kept, Vec::new())
    } else {
        let report = prune(&config)?;
        (report.deleted, report.kept, report.failed)
    };

    print_prune_results(&entries, kept, args.dry_run, format, |p| {
        p.display().to_string()
    })?;

    if !failed.is_empty() {
        let paths: Vec<String> = failed
            .iter()
            .map(|(path, error)| format!("{}: {}", path.display(), error))
            .collect();
        return Err(ExitError::new(
            EXIT_IO,
            format!("failed to delete {} log(s):\n  {}", failed.len(), paths.join("\n  ")),
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "prune_tests.rs"]
mod tests;
