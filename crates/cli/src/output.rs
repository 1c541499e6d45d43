// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a timestamp as relative time (e.g., "5s", "2m", "1h", "3d")
pub fn format_time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed_secs = (now - at).num_seconds().max(0) as u64;
    hourly_core::format_elapsed(elapsed_secs)
}

/// Print prune results in text or JSON format.
///
/// - `entries`: the deleted (or, in a dry run, deletable) logs.
/// - `kept`: how many logs the policy keeps.
/// - `format_entry`: text printed after "Deleted" / "Would delete".
pub fn print_prune_results<T: Serialize>(
    entries: &[T],
    kept: usize,
    dry_run: bool,
    format: OutputFormat,
    format_entry: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            if dry_run {
                println!("Dry run, no changes made\n");
            }

            let label = if dry_run { "Would delete" } else { "Deleted" };
            for entry in entries {
                println!("{} {}", label, format_entry(entry));
            }

            let verb = if dry_run { "would be deleted" } else { "deleted" };
            println!("\n{} log(s) {}, {} kept", entries.len(), verb, kept);
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "dry_run": dry_run,
                "deleted": entries,
                "kept": kept,
            });
            print_json(&obj)?;
        }
    }
    Ok(())
}
