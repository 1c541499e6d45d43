// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run record persistence.
//!
//! One JSON document describing the in-flight or most recently finished
//! run. Written by the runner at start and at finish, read by
//! `hourly status`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Errors that can occur reading or writing the run record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
    /// The runner stopped before the job's result could be logged.
    Aborted,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub pid: u32,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub log_path: PathBuf,
}

impl RunRecord {
    /// Record for a run that has just started.
    pub fn started(log_path: PathBuf, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pid: std::process::id(),
            status: RunStatus::Running,
            started_at,
            finished_at: None,
            exit_code: None,
            log_path,
        }
    }

    /// Mark the run finished with the job's exit code.
    pub fn finish(&mut self, exit_code: i32, finished_at: DateTime<Utc>) {
        self.status = if exit_code == 0 {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        };
        self.exit_code = Some(exit_code);
        self.finished_at = Some(finished_at);
    }

    /// Mark the run aborted by a runner-side failure.
    pub fn abort(&mut self, finished_at: DateTime<Utc>) {
        self.status = RunStatus::Aborted;
        self.finished_at = Some(finished_at);
    }

    /// Save atomically (write to .tmp, then rename).
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    /// Load the record if it exists.
    ///
    /// Returns `Ok(None)` if the file doesn't exist or is corrupt.
    pub fn load(path: &Path) -> Result<Option<Self>, RecordError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(
                    error = %e,
                    path = %path.display(),
                    "corrupt run record, ignoring",
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "run_record_tests.rs"]
mod tests;
