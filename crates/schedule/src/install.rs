// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule installer.
//!
//! Installation advances through fixed stages:
//!
//! ```text
//! NotStarted -> PrerequisitesChecked -> RunnerWritten -> PermissionsSet
//!            -> SyntaxValidated -> Registered -> Verified
//! ```
//!
//! A failed check halts at the stage reached. Nothing is rolled back; every
//! step is idempotent, so installing again starts over safely.

use std::ffi::OsString;
use std::path::PathBuf;

use hourly_core::{exit_code_of, is_executable, resolve_program, JobEnv, RunnerConfig};
use serde::Serialize;
use tokio::process::Command;

use crate::checks::{CheckResult, CheckStatus, Section, Summary};
use crate::script::{self, RUNNER_MODE};
use crate::table::{count_entries, upsert_entry, ScheduleTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStage {
    NotStarted,
    PrerequisitesChecked,
    RunnerWritten,
    PermissionsSet,
    SyntaxValidated,
    Registered,
    Verified,
}

impl std::fmt::Display for InstallStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InstallStage::NotStarted => "not started",
            InstallStage::PrerequisitesChecked => "prerequisites checked",
            InstallStage::RunnerWritten => "runner written",
            InstallStage::PermissionsSet => "permissions set",
            InstallStage::SyntaxValidated => "syntax validated",
            InstallStage::Registered => "registered",
            InstallStage::Verified => "verified",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Absolute path of the `hourly` binary the runner script execs
    pub hourly_bin: PathBuf,
    /// Execute the runner script once after a successful install
    pub smoke_test: bool,
}

/// Result of executing the runner script once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmokeTest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SmokeTest {
    pub fn passed(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub stage: InstallStage,
    pub status: CheckStatus,
    pub runner_script: PathBuf,
    pub table: String,
    pub sections: Vec<Section>,
    pub summary: Summary,
    /// Reported apart from the installation result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoke_test: Option<SmokeTest>,
}

impl InstallReport {
    pub fn succeeded(&self) -> bool {
        self.stage == InstallStage::Verified && self.summary.error == 0
    }
}

pub struct Installer<'a> {
    config: &'a RunnerConfig,
    table: &'a dyn ScheduleTable,
    options: InstallOptions,
}

impl<'a> Installer<'a> {
    pub fn new(
        config: &'a RunnerConfig,
        table: &'a dyn ScheduleTable,
        options: InstallOptions,
    ) -> Self {
        Self {
            config,
            table,
            options,
        }
    }

    pub async fn install(&self) -> InstallReport {
        let mut sections = Vec::new();
        let stage = self.advance(&mut sections).await;
        tracing::info!(%stage, table = %self.table.describe(), "install finished");

        let smoke_test = if self.options.smoke_test && stage == InstallStage::Verified {
            Some(self.smoke_test().await)
        } else {
            None
        };

        let summary = Summary::of(&sections);
        InstallReport {
            stage,
            status: summary.status(),
            runner_script: self.config.schedule.runner_script.clone(),
            table: self.table.describe(),
            sections,
            summary,
            smoke_test,
        }
    }

    async fn advance(&self, sections: &mut Vec<Section>) -> InstallStage {
        let prerequisites = self.check_prerequisites();
        let passed = !prerequisites.has_errors();
        sections.push(prerequisites);
        if !passed {
            return InstallStage::NotStarted;
        }

        let mut runner = Section::new("Runner script");
        let stage = self.install_runner(&mut runner).await;
        sections.push(runner);
        if stage != InstallStage::SyntaxValidated {
            return stage;
        }

        let mut registration = Section::new("Schedule");
        let registered = self.register(&mut registration).await;
        sections.push(registration);
        if !registered {
            return InstallStage::SyntaxValidated;
        }

        let mut verification = Section::new("Verification");
        self.verify(&mut verification).await;
        let passed = !verification.has_errors();
        sections.push(verification);
        if passed {
            InstallStage::Verified
        } else {
            InstallStage::Registered
        }
    }

    /// Every prerequisite is checked and reported, even after a failure.
    fn check_prerequisites(&self) -> Section {
        let config = self.config;
        let mut section = Section::new("Prerequisites");

        match &config.config_path {
            Some(path) => section.push(CheckResult::ok(format!("config {}", path.display()))),
            None => section.push(CheckResult::warn("no hourly.toml found, using defaults")),
        }

        if is_executable(&self.options.hourly_bin) {
            section.push(CheckResult::ok(format!(
                "hourly binary {}",
                self.options.hourly_bin.display()
            )));
        } else {
            section.push(CheckResult::error(format!(
                "hourly binary not executable: {}",
                self.options.hourly_bin.display()
            )));
        }

        if !config.working_dir.is_dir() {
            section.push(CheckResult::error(format!(
                "working directory does not exist: {}",
                config.working_dir.display()
            )));
        }

        let env = match JobEnv::load(&config.env_file) {
            Ok(env) => {
                let missing = env.missing_keys(&config.required_env);
                if missing.is_empty() {
                    section.push(CheckResult::ok(format!(
                        "configuration file {} ({} keys)",
                        config.env_file.display(),
                        env.len()
                    )));
                } else {
                    section.push(CheckResult::error(format!(
                        "configuration file {} is missing required keys: {}",
                        config.env_file.display(),
                        missing.join(", ")
                    )));
                }
                env
            }
            Err(e) => {
                section.push(CheckResult::error(e.to_string()));
                JobEnv::default()
            }
        };

        let path_var = env
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"));
        match resolve_program(config.program(), &config.working_dir, path_var.as_deref()) {
            Some(program) => section.push(CheckResult::ok(format!(
                "job runtime {} at {}",
                config.program(),
                program.display()
            ))),
            None => section.push(CheckResult::error(format!(
                "job runtime not found: {}",
                config.program()
            ))),
        }

        if let Some(entry_point) = &config.entry_point {
            if entry_point.is_file() {
                section.push(CheckResult::ok(format!(
                    "entry point {}",
                    entry_point.display()
                )));
            } else {
                section.push(CheckResult::error(format!(
                    "entry point not found: {}",
                    entry_point.display()
                )));
            }
        }

        section
    }

    /// Write, chmod and syntax-check the runner script. Returns the stage reached.
    async fn install_runner(&self, section: &mut Section) -> InstallStage {
        let path = &self.config.schedule.runner_script;
        let content = script::render(
            &self.config.working_dir,
            &self.options.hourly_bin,
            self.config.config_path.as_deref(),
        );

        match script::write(path, &content) {
            Ok(true) => section.push(CheckResult::ok(format!("wrote {}", path.display()))),
            Ok(false) => section.push(CheckResult::ok(format!("{} is up to date", path.display()))),
            Err(e) => {
                section.push(CheckResult::error(format!(
                    "failed to write {}: {}",
                    path.display(),
                    e
                )));
                return InstallStage::PrerequisitesChecked;
            }
        }

        if let Err(e) = script::set_executable(path) {
            section.push(CheckResult::error(format!(
                "failed to set mode {:o}: {}",
                RUNNER_MODE, e
            )));
            return InstallStage::RunnerWritten;
        }
        section.push(CheckResult::ok(format!("mode {:o}", RUNNER_MODE)));

        if let Err(e) = script::check_syntax(path).await {
            section.push(CheckResult::error(format!("syntax check failed: {}", e)));
            return InstallStage::PermissionsSet;
        }
        section.push(CheckResult::ok("syntax valid (sh -n)"));

        InstallStage::SyntaxValidated
    }

    /// Replace any entries for the runner with exactly one.
    async fn register(&self, section: &mut Section) -> bool {
        let runner = &self.config.schedule.runner_script;
        let content = match self.table.read().await {
            Ok(content) => content,
            Err(e) => {
                section.push(CheckResult::error(e.to_string()));
                return false;
            }
        };

        let updated = upsert_entry(&content, runner, &self.config.schedule.cadence);
        if updated == content {
            section.push(CheckResult::ok(format!(
                "already registered in {}",
                self.table.describe()
            )));
            return true;
        }

        let previous = count_entries(&content, runner);
        if let Err(e) = self.table.write(&updated).await {
            section.push(CheckResult::error(e.to_string()));
            return false;
        }
        tracing::info!(
            runner = %runner.display(),
            cadence = %self.config.schedule.cadence,
            replaced = previous,
            "registered runner"
        );
        section.push(CheckResult::ok(format!(
            "registered '{} {}' in {}",
            self.config.schedule.cadence,
            runner.display(),
            self.table.describe()
        )));
        true
    }

    async fn verify(&self, section: &mut Section) {
        let runner = &self.config.schedule.runner_script;

        match self.table.read().await {
            Ok(content) => match count_entries(&content, runner) {
                1 => section.push(CheckResult::ok("exactly one schedule entry")),
                n => section.push(CheckResult::error(format!(
                    "expected one schedule entry for {}, found {}",
                    runner.display(),
                    n
                ))),
            },
            Err(e) => section.push(CheckResult::error(e.to_string())),
        }

        if is_executable(runner) {
            section.push(CheckResult::ok("runner script is executable"));
        } else {
            section.push(CheckResult::error(format!(
                "runner script missing or not executable: {}",
                runner.display()
            )));
        }

        let log_dir = self.config.layout.dir();
        if log_dir.is_dir() {
            section.push(CheckResult::ok(format!("log directory {}", log_dir.display())));
        } else {
            match std::fs::create_dir_all(log_dir) {
                Ok(()) => section.push(CheckResult::ok(format!(
                    "created log directory {}",
                    log_dir.display()
                ))),
                Err(e) => section.push(CheckResult::error(format!(
                    "failed to create log directory {}: {}",
                    log_dir.display(),
                    e
                ))),
            }
        }
    }

    async fn smoke_test(&self) -> SmokeTest {
        let runner = &self.config.schedule.runner_script;
        tracing::info!(runner = %runner.display(), "running smoke test");
        match Command::new(runner).status().await {
            Ok(status) => SmokeTest {
                exit_code: Some(exit_code_of(&status)),
                error: None,
            },
            Err(e) => SmokeTest {
                exit_code: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
