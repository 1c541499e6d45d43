// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dual-sink logger.
//!
//! Every byte of the job's combined output goes, in order, to:
//!   1. the run's timestamped log file
//!   2. a staging copy of the latest mirror
//!   3. the terminal (best effort, optional)
//!
//! When the run completes both files are synced and the staging copy is
//! renamed over the latest path. Readers of the latest path therefore see
//! either the previous complete run or this complete run.
//!
//! The exit code comes from the child's wait status, never from the copy
//! loop. Output is read until EOF, so a background process that inherits
//! the job's stdout keeps the capture open until it exits too.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, PipeReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use chrono::{DateTime, TimeZone};
use hourly_core::{exit_code_of, LogLayout};
use tokio::process::Child;
use tokio::task::JoinError;

use crate::error::{LogError, RunError};

/// Upper bound on `_N` suffixes tried for runs started in the same second.
const MAX_NAME_ATTEMPTS: u32 = 100;

const READ_CHUNK: usize = 8 * 1024;

/// A finished run's log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub path: PathBuf,
    pub latest_path: PathBuf,
    pub bytes_written: u64,
}

#[derive(Debug)]
pub struct DualSink {
    entry_path: PathBuf,
    entry: File,
    staging_path: PathBuf,
    staging: File,
    latest_path: PathBuf,
    echo: Option<std::io::Stdout>,
    bytes_written: u64,
    at_line_start: bool,
}

impl DualSink {
    /// Create the run's timestamped file (never reusing an existing name)
    /// and a fresh staging file for the latest mirror.
    pub fn create<Tz: TimeZone>(
        layout: &LogLayout,
        started_at: &DateTime<Tz>,
        echo: bool,
    ) -> Result<Self, LogError>
    where
        Tz::Offset: std::fmt::Display,
    {
        fs::create_dir_all(layout.dir()).map_err(|source| LogError::CreateDir {
            path: layout.dir().to_path_buf(),
            source,
        })?;

        let (entry_path, entry) = create_entry(layout, started_at)?;

        let staging_path = layout.latest_staging_path();
        let staging = File::create(&staging_path).map_err(|source| LogError::Create {
            path: staging_path.clone(),
            source,
        })?;

        Ok(Self {
            entry_path,
            entry,
            staging_path,
            staging,
            latest_path: layout.latest_path(),
            echo: echo.then(std::io::stdout),
            bytes_written: 0,
            at_line_start: true,
        })
    }

    pub fn entry_path(&self) -> &Path {
        &self.entry_path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Write `buf` to both files, then echo it.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<(), LogError> {
        if buf.is_empty() {
            return Ok(());
        }
        self.entry
            .write_all(buf)
            .map_err(|source| LogError::Write {
                path: self.entry_path.clone(),
                source,
            })?;
        self.staging
            .write_all(buf)
            .map_err(|source| LogError::Write {
                path: self.staging_path.clone(),
                source,
            })?;
        self.bytes_written += buf.len() as u64;
        self.at_line_start = buf.ends_with(b"\n");
        self.echo(buf);
        Ok(())
    }

    /// Write one line, starting a new line first if the job's output
    /// ended mid-line.
    pub fn write_line(&mut self, line: &str) -> Result<(), LogError> {
        if !self.at_line_start {
            self.write_all(b"\n")?;
        }
        self.write_all(line.as_bytes())?;
        self.write_all(b"\n")
    }

    /// Copy `reader` into the sinks until EOF. Returns the bytes copied.
    pub fn pump(&mut self, mut reader: impl Read) -> Result<u64, LogError> {
        let mut buf = [0u8; READ_CHUNK];
        let mut total = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(LogError::Read(e)),
            };
            self.write_all(&buf[..n])?;
            total += n as u64;
        }
        Ok(total)
    }

    /// Sync both files and publish the staging copy as the latest mirror.
    pub fn finish(self) -> Result<LogEntry, LogError> {
        self.entry.sync_all().map_err(|source| LogError::Write {
            path: self.entry_path.clone(),
            source,
        })?;
        self.staging.sync_all().map_err(|source| LogError::Write {
            path: self.staging_path.clone(),
            source,
        })?;
        fs::rename(&self.staging_path, &self.latest_path).map_err(|source| {
            LogError::Publish {
                path: self.latest_path.clone(),
                source,
            }
        })?;

        Ok(LogEntry {
            path: self.entry_path,
            latest_path: self.latest_path,
            bytes_written: self.bytes_written,
        })
    }

    fn echo(&mut self, buf: &[u8]) {
        let Some(out) = self.echo.as_mut() else {
            return;
        };
        let mut out = out.lock();
        if let Err(e) = out.write_all(buf).and_then(|()| out.flush()) {
            drop(out);
            tracing::warn!(error = %e, "terminal echo failed, continuing with log files only");
            self.echo = None;
        }
    }
}

fn create_entry<Tz: TimeZone>(
    layout: &LogLayout,
    started_at: &DateTime<Tz>,
) -> Result<(PathBuf, File), LogError>
where
    Tz::Offset: std::fmt::Display,
{
    let mut last_err = None;
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = layout.entry_path(started_at, attempt);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => last_err = Some((path, e)),
            Err(source) => return Err(LogError::Create { path, source }),
        }
    }
    let (path, source) = last_err.unwrap_or_else(|| {
        (
            layout.entry_path(started_at, 0),
            std::io::Error::from(ErrorKind::AlreadyExists),
        )
    });
    Err(LogError::Create { path, source })
}

/// Result of running a job through the sinks.
#[derive(Debug)]
pub struct Captured {
    /// The job's exit code
    pub exit_code: i32,
    /// Bytes of job output copied (excluding banners)
    pub bytes_written: u64,
    /// The sinks, still open for the closing banner
    pub sink: DualSink,
}

enum FirstDone {
    Exited(std::io::Result<ExitStatus>),
    Drained(Result<(DualSink, Result<u64, LogError>), JoinError>),
}

/// Copy the job's output into `sink` while waiting for it to exit.
///
/// If a sink write fails the job is killed and the write error returned.
pub async fn capture(
    mut child: Child,
    output: PipeReader,
    mut sink: DualSink,
) -> Result<Captured, RunError> {
    let mut pump = tokio::task::spawn_blocking(move || {
        let result = sink.pump(output);
        (sink, result)
    });

    let first = tokio::select! {
        status = child.wait() => FirstDone::Exited(status),
        joined = &mut pump => FirstDone::Drained(joined),
    };

    let (status, joined) = match first {
        FirstDone::Exited(status) => {
            let status = status.map_err(RunError::Wait)?;
            (status, pump.await)
        }
        FirstDone::Drained(joined) => {
            // Output closed while the job still runs: either the job closed
            // its stdout, or a sink failed and the job must not outlive the run.
            if !matches!(&joined, Ok((_, Ok(_)))) {
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "failed to kill job after log failure");
                }
            }
            let status = child.wait().await.map_err(RunError::Wait)?;
            (status, joined)
        }
    };

    let (sink, pumped) =
        joined.map_err(|e| RunError::Log(LogError::Read(std::io::Error::other(e))))?;
    let bytes_written = pumped?;

    Ok(Captured {
        exit_code: exit_code_of(&status),
        bytes_written,
        sink,
    })
}

#[cfg(test)]
#[path = "dual_sink_tests.rs"]
mod tests;
