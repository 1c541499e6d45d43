// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

/// Config file named by HOURLY_CONFIG, used when `--config` is not given.
pub fn config_path() -> Option<PathBuf> {
    non_empty("HOURLY_CONFIG").map(PathBuf::from)
}

/// Plain-file schedule table to use instead of the user's crontab.
pub fn schedule_table() -> Option<PathBuf> {
    non_empty("HOURLY_SCHEDULE_TABLE").map(PathBuf::from)
}

/// `hourly` binary the runner script should exec (defaults to this executable).
pub fn hourly_bin() -> Option<PathBuf> {
    non_empty("HOURLY_BIN").map(PathBuf::from)
}

pub fn rust_log() -> Option<String> {
    non_empty("RUST_LOG")
}

// --- Color ---

pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok_and(|v| v == "1")
}

pub fn force_color() -> bool {
    std::env::var("COLOR").is_ok_and(|v| v == "1")
}
