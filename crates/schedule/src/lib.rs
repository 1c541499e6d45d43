// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hourly-schedule: registering the runner with the host scheduler.
//!
//! The installer writes a small runner script, validates it, and makes sure
//! the host schedule table holds exactly one entry that executes it.

pub mod checks;
pub mod install;
pub mod script;
pub mod subprocess;
pub mod table;

pub use checks::{CheckResult, CheckStatus, Section, Summary};
pub use install::{InstallOptions, InstallReport, InstallStage, Installer, SmokeTest};
pub use table::{count_entries, upsert_entry, Crontab, ScheduleError, ScheduleTable, TableFile};

#[cfg(test)]
mod test_helpers;
