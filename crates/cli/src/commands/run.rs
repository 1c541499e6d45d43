// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hourly run`: one scheduled run of the batch job.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Args;
use hourly_core::{EXIT_CONFIG, EXIT_IO};
use hourly_runner::{JobInvoker, RunOptions, RunOutcome};
use serde::Serialize;

use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    /// Write job output to the log files only, not the terminal
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum RunReport {
    Completed {
        exit_code: i32,
        log_path: PathBuf,
        latest_path: PathBuf,
        output_bytes: u64,
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
        deleted_logs: Vec<PathBuf>,
    },
    Skipped {
        #[serde(skip_serializing_if = "Option::is_none")]
        holder_pid: Option<u32>,
    },
}

impl From<&RunOutcome> for RunReport {
    fn from(outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed(summary) => RunReport::Completed {
                exit_code: summary.exit_code,
                log_path: summary.log_path.clone(),
                latest_path: summary.latest_path.clone(),
                output_bytes: summary.output_bytes,
                started_at: summary.started_at,
                finished_at: summary.finished_at,
                deleted_logs: summary.retention.deleted.clone(),
            },
            RunOutcome::Skipped { holder_pid } => RunReport::Skipped {
                holder_pid: *holder_pid,
            },
        }
    }
}

pub async fn handle(args: RunArgs, config_flag: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = super::load_config(config_flag)?;

    // Fail before the diagnostics log is opened so a misconfigured run
    // leaves the log directory untouched.
    JobInvoker::prepare(&config).map_err(|e| ExitError::new(EXIT_CONFIG, e.to_string()))?;

    let _guard = crate::logging::init(Some(&config.layout.runner_log_path()))
        .map_err(|e| ExitError::new(EXIT_IO, format!("{:#}", e)))?;

    let options = RunOptions {
        // stdout carries the JSON report in json mode
        echo: !args.quiet && format == OutputFormat::Text,
    };
    let outcome = hourly_runner::run(&config, &options)
        .await
        .map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;

    if format == OutputFormat::Json {
        print_json(&RunReport::from(&outcome))?;
    }

    match outcome.exit_code() {
        0 => Ok(()),
        code => Err(ExitError::silent(code).into()),
    }
}
