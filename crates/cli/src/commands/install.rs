// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hourly install`: register the runner with the host scheduler.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use hourly_schedule::{
    CheckStatus, Crontab, InstallOptions, InstallReport, Installer, ScheduleTable, SmokeTest,
    TableFile,
};

use crate::color;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct InstallArgs {
    /// Run the installed runner once and report its exit code
    #[arg(long)]
    pub smoke_test: bool,
}

/// `HOURLY_SCHEDULE_TABLE` selects a plain file; otherwise the user's crontab.
fn schedule_table() -> Box<dyn ScheduleTable> {
    match crate::env::schedule_table() {
        Some(path) => Box::new(TableFile::new(path)),
        None => Box::new(Crontab::new()),
    }
}

fn render_text(report: &InstallReport) -> String {
    let mut out = String::new();
    out.push_str("hourly install\n");
    out.push_str(&format!("{}\n", "=".repeat(50)));

    for section in &report.sections {
        if section.checks.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(&format!("{}\n", color::header(&section.name)));
        out.push_str(&format!("{}\n", "-".repeat(section.name.len())));
        for check in &section.checks {
            let label = match check.status {
                CheckStatus::Ok => color::green("  OK   "),
                CheckStatus::Warn => color::yellow("  WARN "),
                CheckStatus::Error => color::red("  ERROR"),
            };
            out.push_str(&format!("{} {}\n", label, check.message));
        }
    }

    out.push('\n');
    let status_label = if report.succeeded() {
        "INSTALLED"
    } else {
        "FAILED"
    };
    out.push_str(&format!(
        "{} (stage: {}): {} ok, {} warning(s), {} error(s)\n",
        status_label, report.stage, report.summary.ok, report.summary.warn, report.summary.error,
    ));

    if let Some(smoke) = &report.smoke_test {
        out.push_str(&format!("{}\n", smoke_test_line(smoke)));
    }
    out
}

fn smoke_test_line(smoke: &SmokeTest) -> String {
    match (smoke.exit_code, &smoke.error) {
        (Some(0), _) => format!("Smoke test: {}", color::green("passed (exit code 0)")),
        (Some(code), _) => format!("Smoke test: {}", color::red(&format!("failed (exit code {})", code))),
        (None, Some(error)) => format!("Smoke test: {}", color::red(&format!("could not run: {}", error))),
        (None, None) => "Smoke test: not run".to_string(),
    }
}

pub async fn handle(
    args: InstallArgs,
    config_flag: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = super::load_config(config_flag)?;
    let hourly_bin = match crate::env::hourly_bin() {
        Some(path) => path,
        None => std::env::current_exe().context("failed to locate the hourly binary")?,
    };
    let table = schedule_table();

    let installer = Installer::new(
        &config,
        table.as_ref(),
        InstallOptions {
            hourly_bin,
            smoke_test: args.smoke_test,
        },
    );
    let report = installer.install().await;

    match format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => print_json(&report)?,
    }

    if report.succeeded() {
        Ok(())
    } else {
        Err(ExitError::silent(1).into())
    }
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
