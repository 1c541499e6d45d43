// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One scheduled run, start to finish.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Local, Utc};
use hourly_core::{format_banner_time, format_elapsed, RunRecord, RunnerConfig};

use crate::dual_sink::{capture, Captured, DualSink};
use crate::error::{LogError, RunError};
use crate::invoker::JobInvoker;
use crate::lock::RunLock;
use crate::retention::{self, RetentionReport};

/// Exit code reported when the resolved program could not be executed
/// (shell convention for "found but not executable").
const EXIT_CANNOT_EXECUTE: i32 = 126;

const BANNER_RULE: &str =
    "================================================================================";

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Forward output to the terminal as well as the log files
    pub echo: bool,
}

#[derive(Debug)]
pub struct RunSummary {
    pub exit_code: i32,
    pub log_path: PathBuf,
    pub latest_path: PathBuf,
    /// Bytes of job output captured
    pub output_bytes: u64,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub retention: RetentionReport,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// The job ran; its exit code is in the summary.
    Completed(RunSummary),
    /// Another run holds the lock. Nothing was written.
    Skipped { holder_pid: Option<u32> },
}

impl RunOutcome {
    /// Exit code the runner process should report.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed(summary) => summary.exit_code,
            RunOutcome::Skipped { .. } => 0,
        }
    }
}

/// Execute one run of the configured job.
///
/// Order matters: preconditions are checked before anything touches the
/// log directory; the job's logs are complete before retention runs; the
/// lock is held until retention is done.
pub async fn run(config: &RunnerConfig, options: &RunOptions) -> Result<RunOutcome, RunError> {
    let invoker = JobInvoker::prepare(config)?;
    let layout = &config.layout;

    let lock_path = layout.lock_path();
    let Some(lock) = RunLock::try_acquire(&lock_path).map_err(|source| RunError::Lock {
        path: lock_path.clone(),
        source,
    })?
    else {
        let holder_pid = RunLock::holder_pid(&lock_path);
        tracing::warn!(?holder_pid, "previous run still in progress, skipping this run");
        return Ok(RunOutcome::Skipped { holder_pid });
    };

    let started_at = Local::now();
    let clock = Instant::now();
    let mut sink = DualSink::create(layout, &started_at, options.echo)?;
    let log_path = sink.entry_path().to_path_buf();
    tracing::info!(log = %log_path.display(), "run started");

    let mut record = RunRecord::started(log_path.clone(), started_at.with_timezone(&Utc));
    save_record(&record, config);

    let captured = match write_header(&invoker, config, &mut sink, &started_at) {
        Ok(()) => run_job(&invoker, sink).await,
        Err(e) => Err(e.into()),
    };
    let Captured {
        exit_code,
        bytes_written: output_bytes,
        mut sink,
    } = match captured {
        Ok(c) => c,
        Err(e) => {
            record.abort(Utc::now());
            save_record(&record, config);
            return Err(e);
        }
    };

    let finished_at = Local::now();
    let entry = write_footer(&mut sink, exit_code, &finished_at, clock)
        .and_then(|()| sink.finish())
        .inspect_err(|_| {
            record.abort(Utc::now());
            save_record(&record, config);
        })?;

    record.finish(exit_code, finished_at.with_timezone(&Utc));
    save_record(&record, config);

    let retention = retention::enforce(layout, config.retention, Some(&entry.path));
    drop(lock);

    if exit_code == 0 {
        tracing::info!(exit_code, output_bytes, "run succeeded");
    } else {
        tracing::warn!(exit_code, output_bytes, "run failed");
    }

    Ok(RunOutcome::Completed(RunSummary {
        exit_code,
        log_path: entry.path,
        latest_path: entry.latest_path,
        output_bytes,
        started_at,
        finished_at,
        retention,
    }))
}

fn write_header(
    invoker: &JobInvoker<'_>,
    config: &RunnerConfig,
    sink: &mut DualSink,
    started_at: &DateTime<Local>,
) -> Result<(), LogError> {
    sink.write_line(BANNER_RULE)?;
    sink.write_line(&format!("BATCH RUN STARTED {}", format_banner_time(started_at)))?;
    sink.write_line(&format!("command: {}", config.command_line()))?;
    sink.write_line(&format!("program: {}", invoker.program().display()))?;
    sink.write_line(&format!("working directory: {}", config.working_dir.display()))?;
    sink.write_line(BANNER_RULE)
}

async fn run_job(invoker: &JobInvoker<'_>, mut sink: DualSink) -> Result<Captured, RunError> {
    match invoker.spawn() {
        Ok((child, output)) => capture(child, output, sink).await,
        Err(e) => {
            tracing::error!(error = %e, "failed to start job");
            sink.write_line(&format!("failed to start job: {}", e))?;
            Ok(Captured {
                exit_code: EXIT_CANNOT_EXECUTE,
                bytes_written: 0,
                sink,
            })
        }
    }
}

fn write_footer(
    sink: &mut DualSink,
    exit_code: i32,
    finished_at: &DateTime<Local>,
    clock: Instant,
) -> Result<(), LogError> {
    let marker = if exit_code == 0 { "SUCCESS" } else { "FAILED" };
    sink.write_line(BANNER_RULE)?;
    sink.write_line(&format!(
        "BATCH RUN FINISHED {} (took {})",
        format_banner_time(finished_at),
        format_elapsed(clock.elapsed().as_secs())
    ))?;
    sink.write_line(&format!("exit code: {}", exit_code))?;
    sink.write_line(&format!("status: {}", marker))?;
    sink.write_line(BANNER_RULE)
}

/// Run record updates are bookkeeping for `hourly status`; a failure to
/// write one never changes the run's result.
fn save_record(record: &RunRecord, config: &RunnerConfig) {
    let path = config.layout.record_path();
    if let Err(e) = record.save(&path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to save run record");
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
