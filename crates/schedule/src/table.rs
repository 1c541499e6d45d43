// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host schedule table adapters.
//!
//! A table is read and written as a whole. Registration rewrites the full
//! content, so a failed write leaves the previous table in place and a
//! successful one never holds a duplicate entry.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::script::shell_quote;
use crate::subprocess::{run_with_timeout, stderr_text, CRONTAB_TIMEOUT};

/// Errors reading or writing a schedule table
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to read schedule table {table}: {message}")]
    Read { table: String, message: String },

    #[error("failed to write schedule table {table}: {message}")]
    Write { table: String, message: String },
}

/// A host schedule table holding `<cadence> <command>` lines.
#[async_trait]
pub trait ScheduleTable: Send + Sync {
    /// Human-readable name for reports
    fn describe(&self) -> String;

    /// Full table content; a table that does not exist yet is empty.
    async fn read(&self) -> Result<String, ScheduleError>;

    /// Replace the whole table.
    async fn write(&self, content: &str) -> Result<(), ScheduleError>;
}

/// The invoking user's crontab, managed through the `crontab` command.
#[derive(Debug, Clone)]
pub struct Crontab {
    program: PathBuf,
}

impl Default for Crontab {
    fn default() -> Self {
        Self {
            program: PathBuf::from("crontab"),
        }
    }
}

impl Crontab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `crontab` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ScheduleTable for Crontab {
    fn describe(&self) -> String {
        "user crontab".to_string()
    }

    async fn read(&self) -> Result<String, ScheduleError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-l").stdin(Stdio::null());
        let output = run_with_timeout(cmd, CRONTAB_TIMEOUT, "crontab -l")
            .await
            .map_err(|message| ScheduleError::Read {
                table: self.describe(),
                message,
            })?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        let stderr = stderr_text(&output);
        // cron prints "no crontab for <user>" and exits 1 for an empty table
        if stderr.to_lowercase().contains("no crontab") {
            return Ok(String::new());
        }
        Err(ScheduleError::Read {
            table: self.describe(),
            message: stderr,
        })
    }

    async fn write(&self, content: &str) -> Result<(), ScheduleError> {
        let write_err = |message: String| ScheduleError::Write {
            table: self.describe(),
            message,
        };

        let mut child = Command::new(&self.program)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| write_err(format!("crontab - failed: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(content.as_bytes())
                .await
                .map_err(|e| write_err(format!("crontab - failed: {}", e)))?;
            // Closing stdin lets crontab install the table
            drop(stdin);
        }

        let output = tokio::time::timeout(CRONTAB_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| {
                write_err(format!(
                    "crontab - timed out after {}s",
                    CRONTAB_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| write_err(format!("crontab - failed: {}", e)))?;
        if !output.status.success() {
            return Err(write_err(stderr_text(&output)));
        }
        Ok(())
    }
}

/// A schedule table kept in a plain file (cron.d style).
#[derive(Debug, Clone)]
pub struct TableFile {
    path: PathBuf,
}

impl TableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ScheduleTable for TableFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read(&self) -> Result<String, ScheduleError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(ScheduleError::Read {
                table: self.describe(),
                message: e.to_string(),
            }),
        }
    }

    /// Written to a sibling temp file and renamed into place.
    async fn write(&self, content: &str) -> Result<(), ScheduleError> {
        let write_err = |e: std::io::Error| ScheduleError::Write {
            table: self.describe(),
            message: e.to_string(),
        };
        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = tokio::fs::File::create(&tmp_path).await.map_err(write_err)?;
            file.write_all(content.as_bytes()).await.map_err(write_err)?;
            file.sync_all().await.map_err(write_err)?;
        }
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(write_err)
    }
}

/// How `runner` appears as the command of a table line.
///
/// cron hands the command to `sh`, so a path outside the plain set is
/// single-quoted.
fn command_word(runner: &Path) -> String {
    let path = runner.display().to_string();
    let plain = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | ',' | ':' | '@'));
    if plain {
        path
    } else {
        shell_quote(&path)
    }
}

/// Whether an active (non-comment) table line executes `runner`.
///
/// `word` is the runner's [`command_word`]; a quoted word may span several
/// whitespace-separated tokens, so it is matched with its leading separator.
fn references(line: &str, runner: &str, word: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return false;
    }
    trimmed.split_whitespace().any(|token| token == runner)
        || (word != runner && trimmed.split_once(word).is_some_and(|(before, after)| {
            before.ends_with(char::is_whitespace)
                && after.chars().next().is_none_or(char::is_whitespace)
        }))
}

/// The table line registering `runner` at `cadence`.
pub fn entry_line(cadence: &str, runner: &Path) -> String {
    format!("{} {}", cadence.trim(), command_word(runner))
}

/// Number of active entries that execute `runner`.
pub fn count_entries(content: &str, runner: &Path) -> usize {
    let word = command_word(runner);
    let runner = runner.display().to_string();
    content
        .lines()
        .filter(|line| references(line, &runner, &word))
        .count()
}

/// Table content with every entry for `runner` replaced by a single one at
/// `cadence`. Other lines, comments included, are kept in order.
pub fn upsert_entry(content: &str, runner: &Path, cadence: &str) -> String {
    let word = command_word(runner);
    let runner_str = runner.display().to_string();
    let mut updated: String = content
        .lines()
        .filter(|line| !references(line, &runner_str, &word))
        .flat_map(|line| [line, "\n"])
        .collect();
    updated.push_str(&entry_line(cadence, runner));
    // cron ignores a final line without a newline
    updated.push('\n');
    updated
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
