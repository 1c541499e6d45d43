// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The runner script registered in the schedule table.
//!
//! A POSIX `sh` wrapper so the table entry stays a single absolute path:
//! it changes to the job's working directory and execs `hourly run`.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tokio::process::Command;

use crate::subprocess::{run_with_timeout, stderr_text, SYNTAX_CHECK_TIMEOUT};

/// Mode the runner script is installed with.
pub const RUNNER_MODE: u32 = 0o755;

/// Render the runner script.
///
/// `config_path` is passed explicitly when the job has a config file; without
/// one `hourly run` uses the defaults for the working directory.
pub fn render(working_dir: &Path, hourly_bin: &Path, config_path: Option<&Path>) -> String {
    let mut exec = format!("exec {} run --quiet", shell_quote(&hourly_bin.display().to_string()));
    if let Some(config) = config_path {
        exec.push_str(" --config ");
        exec.push_str(&shell_quote(&config.display().to_string()));
    }
    format!(
        "#!/bin/sh\n\
         # Installed by `hourly install`. Runs one batch and exits with its code.\n\
         cd {} || exit 78\n\
         {}\n",
        shell_quote(&working_dir.display().to_string()),
        exec
    )
}

/// Quote `s` as a single `sh` word.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Write the script unless it already has this content.
///
/// Returns whether the file changed.
pub fn write(path: &Path, content: &str) -> std::io::Result<bool> {
    if std::fs::read_to_string(path).is_ok_and(|existing| existing == content) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(true)
}

pub fn set_executable(path: &Path) -> std::io::Result<()> {
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(RUNNER_MODE))
}

/// Parse the script with `sh -n` without running it.
pub async fn check_syntax(path: &Path) -> Result<(), String> {
    let mut cmd = Command::new("sh");
    cmd.arg("-n").arg(path);
    let output = run_with_timeout(cmd, SYNTAX_CHECK_TIMEOUT, "sh -n").await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(stderr_text(&output))
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
