// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded runs of the host tools the installer shells out to.
//!
//! `crontab` can block on a locked spool and `sh -n` on a pathological
//! script; neither may hang an install.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Timeout for `crontab -l` / `crontab -`.
pub const CRONTAB_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for `sh -n` on the runner script.
pub const SYNTAX_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Collect the output of a host tool, giving up after `timeout`.
///
/// Errors are install-report text naming `description`. A tool still
/// running at the deadline is killed when its handle drops.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.kill_on_drop(true);
    tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| format!("{} timed out after {}s", description, timeout.as_secs()))?
        .map_err(|e| format!("{} failed: {}", description, e))
}

/// Trimmed stderr of a finished command, for error messages.
pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
