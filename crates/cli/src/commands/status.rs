// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hourly status`: whether a run is in progress and how the last one went.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use hourly_core::{format_banner_time, RunRecord, RunStatus, RunnerConfig};
use hourly_runner::retention::list_entries;
use hourly_runner::RunLock;
use serde::Serialize;

use crate::color;
use crate::output::{format_time_ago, print_json, OutputFormat};

#[derive(Debug, Serialize)]
struct StatusReport {
    running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    holder_pid: Option<u32>,
    log_dir: PathBuf,
    retained_logs: usize,
    retention: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_run: Option<LastRun>,
}

#[derive(Debug, Serialize)]
struct LastRun {
    status: RunStatus,
    succeeded: bool,
    started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    log_path: PathBuf,
    age: String,
}

impl LastRun {
    fn new(record: RunRecord, now: DateTime<Utc>) -> Self {
        let age = format_time_ago(record.finished_at.unwrap_or(record.started_at), now);
        Self {
            status: record.status,
            succeeded: record.status == RunStatus::Succeeded,
            started_at: record.started_at,
            finished_at: record.finished_at,
            exit_code: record.exit_code,
            log_path: record.log_path,
            age,
        }
    }
}

fn collect(config: &RunnerConfig, now: DateTime<Utc>) -> StatusReport {
    let layout = &config.layout;
    let lock_path = layout.lock_path();
    let running = RunLock::is_held(&lock_path);
    let holder_pid = running.then(|| RunLock::holder_pid(&lock_path)).flatten();

    let retained_logs = match list_entries(layout) {
        Ok(entries) => entries.len(),
        Err(e) => {
            tracing::warn!(dir = %layout.dir().display(), error = %e, "failed to list logs");
            0
        }
    };

    let last_run = match RunRecord::load(&layout.record_path()) {
        Ok(record) => record.map(|r| LastRun::new(r, now)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read run record");
            None
        }
    };

    StatusReport {
        running,
        holder_pid,
        log_dir: layout.dir().to_path_buf(),
        retained_logs,
        retention: config.retention.to_string(),
        last_run,
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    format_banner_time(&at.with_timezone(&Local))
}

fn render_text(report: &StatusReport) -> String {
    let mut out = String::new();
    let state = match (report.running, report.holder_pid) {
        (true, Some(pid)) => color::yellow(&format!("running (pid {})", pid)),
        (true, None) => color::yellow("running"),
        (false, _) => "idle".to_string(),
    };
    out.push_str(&format!("{} {}\n", color::header("Runner:"), state));
    out.push_str(&format!(
        "{} {} ({} retained, {})\n",
        color::header("Logs:"),
        report.log_dir.display(),
        report.retained_logs,
        report.retention
    ));

    let Some(last) = &report.last_run else {
        out.push_str(&format!("{} {}\n", color::header("Last run:"), color::muted("none recorded")));
        return out;
    };

    let outcome = match last.status {
        RunStatus::Succeeded => color::green("SUCCESS"),
        RunStatus::Failed => color::red("FAILED"),
        RunStatus::Running => color::yellow("running"),
        RunStatus::Aborted => color::red("aborted"),
    };
    out.push_str(&format!(
        "{} {} ({} ago)\n",
        color::header("Last run:"),
        outcome,
        last.age
    ));
    out.push_str(&format!("  started:   {}\n", local_time(last.started_at)));
    if let Some(finished_at) = last.finished_at {
        out.push_str(&format!("  finished:  {}\n", local_time(finished_at)));
    }
    if let Some(code) = last.exit_code {
        out.push_str(&format!("  exit code: {}\n", code));
    }
    out.push_str(&format!("  log:       {}\n", last.log_path.display()));
    out
}

pub fn handle(config_flag: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = super::load_config(config_flag)?;
    let report = collect(&config, Utc::now());
    match format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
