// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log directory layout.
//!
//! Used by the runner (writer), the retention manager and `hourly status`
//! (readers) to agree on file names:
//!   `<log_dir>/<prefix><YYYYmmdd_HHMMSS>[_N]<ext>`  one file per run
//!   `<log_dir>/<latest_name>`                       mirror of the newest run
//!   `<log_dir>/.<latest_name>.tmp`                  staging copy of the mirror
//!   `<log_dir>/.hourly.lock`                        run lock (holder PID)
//!   `<log_dir>/.hourly-run.json`                    run record
//!   `<log_dir>/hourly.log`                          runner diagnostics

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::time_fmt::FILE_STAMP_FORMAT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLayout {
    dir: PathBuf,
    prefix: String,
    extension: String,
    latest_name: String,
}

impl LogLayout {
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        extension: impl Into<String>,
        latest_name: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            extension: extension.into(),
            latest_name: latest_name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name for a run started at `at`.
    ///
    /// `attempt` disambiguates runs started within the same second:
    /// 0 gives the bare stamp, N > 0 appends `_N`.
    pub fn entry_file_name<Tz: TimeZone>(&self, at: &DateTime<Tz>, attempt: u32) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let stamp = at.format(FILE_STAMP_FORMAT);
        if attempt == 0 {
            format!("{}{}{}", self.prefix, stamp, self.extension)
        } else {
            format!("{}{}_{}{}", self.prefix, stamp, attempt, self.extension)
        }
    }

    pub fn entry_path<Tz: TimeZone>(&self, at: &DateTime<Tz>, attempt: u32) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        self.dir.join(self.entry_file_name(at, attempt))
    }

    pub fn latest_name(&self) -> &str {
        &self.latest_name
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(&self.latest_name)
    }

    /// Staging file renamed over the latest path once a run completes.
    pub fn latest_staging_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.tmp", self.latest_name))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(".hourly.lock")
    }

    pub fn record_path(&self) -> PathBuf {
        self.dir.join(".hourly-run.json")
    }

    pub fn runner_log_path(&self) -> PathBuf {
        self.dir.join("hourly.log")
    }

    /// Whether `file_name` names a per-run log entry of this layout.
    ///
    /// The part between prefix and extension must start with a digit, which
    /// keeps the latest mirror and the runner's own log out of retention.
    pub fn is_entry(&self, file_name: &str) -> bool {
        if file_name == self.latest_name || file_name.starts_with('.') {
            return false;
        }
        file_name
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_suffix(self.extension.as_str()))
            .is_some_and(|stamp| stamp.starts_with(|c: char| c.is_ascii_digit()))
    }

    /// Creation order of a run log: its start stamp and `_N` attempt.
    ///
    /// Compares numerically on the attempt, so `_10` follows `_2`.
    pub fn entry_order<'a>(&self, file_name: &'a str) -> Option<(&'a str, u32)> {
        if !self.is_entry(file_name) {
            return None;
        }
        let stamp = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.extension.as_str())?;
        let stamp_separators = FILE_STAMP_FORMAT.matches('_').count();
        if stamp.matches('_').count() > stamp_separators {
            if let Some((base, attempt)) = stamp.rsplit_once('_') {
                if let Ok(attempt) = attempt.parse() {
                    return Some((base, attempt));
                }
            }
        }
        Some((stamp, 0))
    }
}

#[cfg(test)]
#[path = "log_paths_tests.rs"]
mod tests;
