// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hourly-core: configuration, log layout and run bookkeeping shared by the
//! runner, the schedule installer and the CLI.

pub mod config;
pub mod env_file;
pub mod exit_code;
pub mod log_paths;
pub mod program;
pub mod run_record;
pub mod time_fmt;

pub use config::{ConfigError, RetentionPolicy, RunnerConfig, ScheduleConfig};
pub use env_file::{EnvFileError, JobEnv};
pub use exit_code::{exit_code_of, EXIT_CONFIG, EXIT_IO};
pub use log_paths::LogLayout;
pub use program::{is_executable, resolve_program};
pub use run_record::{RecordError, RunRecord, RunStatus};
pub use time_fmt::{format_banner_time, format_elapsed};
