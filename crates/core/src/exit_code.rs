// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process exit codes reported by the runner.
//!
//! The job's own code is passed through verbatim. Failures of the runner
//! itself use the sysexits classes below so they stay distinguishable from
//! the usual small job codes.

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Log files could not be written (EX_IOERR).
pub const EXIT_IO: i32 = 74;

/// Configuration or prerequisite failure before the job started (EX_CONFIG).
pub const EXIT_CONFIG: i32 = 78;

/// Exit code of a finished child, using the shell convention `128 + signal`
/// for children terminated by a signal.
pub fn exit_code_of(status: &ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(test)]
#[path = "exit_code_tests.rs"]
mod tests;
