// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process exit codes carried through `anyhow`.

use thiserror::Error;

/// An error that ends the process with a specific exit code.
///
/// An empty message exits silently; the job's own output already explains
/// the failure.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Exit with `code` without printing anything.
    pub fn silent(code: i32) -> Self {
        Self::new(code, String::new())
    }
}
