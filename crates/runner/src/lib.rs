// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hourly-runner: one scheduled run of the batch job.
//!
//! A run takes the run lock, executes the job with its combined output
//! duplicated into a timestamped log and the latest mirror, records the
//! result, and prunes old logs. The job's own exit code is the result.

pub mod dual_sink;
pub mod error;
pub mod invoker;
pub mod lock;
pub mod retention;
mod runner;

pub use dual_sink::{capture, Captured, DualSink, LogEntry};
pub use error::{ConfigurationError, LogError, RunError};
pub use invoker::JobInvoker;
pub use lock::RunLock;
pub use retention::{RetentionPlan, RetentionReport};
pub use runner::{run, RunOptions, RunOutcome, RunSummary};

#[cfg(test)]
mod test_helpers;
