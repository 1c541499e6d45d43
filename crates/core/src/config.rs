// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner configuration.
//!
//! Built once at startup from `hourly.toml` (every field optional) and then
//! passed by reference to the runner and the installer. Relative paths in
//! the file resolve against the working directory, which itself resolves
//! against the directory containing the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::log_paths::LogLayout;

/// Default config file name looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "hourly.toml";

const DEFAULT_COMMAND: [&str; 3] = ["python3", "batch_scheduler.py", "run-once"];
const DEFAULT_ENTRY_POINT: &str = "batch_scheduler.py";
const DEFAULT_ENV_FILE: &str = ".env";
const DEFAULT_REQUIRED_ENV: &str = "AZURE_STORAGE_CONNECTION_STRING";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_PREFIX: &str = "batch_";
const DEFAULT_LOG_EXTENSION: &str = ".log";
const DEFAULT_LATEST_NAME: &str = "latest.log";
const DEFAULT_KEEP_LAST: usize = 30;
const DEFAULT_CADENCE: &str = "0 * * * *";
const DEFAULT_RUNNER_SCRIPT: &str = "run_hourly.sh";

const SECS_PER_DAY: u64 = 86_400;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not resolve directory {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("command must not be empty")]
    EmptyCommand,

    #[error("retention: set either keep_last or max_age_days, not both")]
    ConflictingRetention,

    #[error("retention: {0} must be at least 1")]
    ZeroRetention(&'static str),

    #[error("retention: max_age_days = {0} is too large")]
    RetentionTooLarge(u64),

    #[error("invalid log naming: {0}")]
    InvalidLogName(String),

    #[error("invalid cadence '{0}': expected five cron fields or an @ macro")]
    InvalidCadence(String),
}

/// How many log entries survive retention.
///
/// Exactly one bound applies; the config file picks it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep the N most recently modified entries.
    KeepLast(usize),
    /// Delete entries last modified longer ago than this.
    MaxAge(Duration),
}

impl std::fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetentionPolicy::KeepLast(n) => write!(f, "keep last {}", n),
            RetentionPolicy::MaxAge(age) => {
                write!(f, "max age {}", crate::format_elapsed(age.as_secs()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Cron cadence expression, e.g. `0 * * * *`
    pub cadence: String,
    /// Absolute path of the runner script registered in the schedule table
    pub runner_script: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Config file this was loaded from, if any
    pub config_path: Option<PathBuf>,
    /// Program and arguments of the processing job
    pub command: Vec<String>,
    /// Directory the job runs in
    pub working_dir: PathBuf,
    /// Dotenv file with the job's credentials and parameters
    pub env_file: PathBuf,
    /// Keys that must be present and non-empty in `env_file`
    pub required_env: Vec<String>,
    /// Script or module the job's runtime executes, checked by the installer
    pub entry_point: Option<PathBuf>,
    pub layout: LogLayout,
    pub retention: RetentionPolicy,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    command: Option<Vec<String>>,
    working_dir: Option<PathBuf>,
    env_file: Option<PathBuf>,
    required_env: Option<Vec<String>>,
    entry_point: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    log_prefix: Option<String>,
    log_extension: Option<String>,
    latest_name: Option<String>,
    #[serde(default)]
    retention: RetentionSection,
    #[serde(default)]
    schedule: ScheduleSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RetentionSection {
    keep_last: Option<usize>,
    max_age_days: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScheduleSection {
    cadence: Option<String>,
    runner_script: Option<PathBuf>,
}

impl RunnerConfig {
    /// Load configuration from a file that must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let path = absolutize(path)?;
        let base_dir = path.parent().unwrap_or(Path::new("/")).to_path_buf();
        let mut config = Self::parse(&content, &path, &base_dir)?;
        config.config_path = Some(path);
        Ok(config)
    }

    /// Load configuration from `path` if it exists, otherwise use defaults
    /// rooted at the directory `path` would live in.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        let path = absolutize(path)?;
        let base_dir = path.parent().unwrap_or(Path::new("/")).to_path_buf();
        Self::parse("", &path, &base_dir)
    }

    /// Parse config text with relative paths rooted at `base_dir`.
    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let base_dir = absolutize(base_dir)?;
        Self::parse(content, &base_dir.join(DEFAULT_CONFIG_FILE), &base_dir)
    }

    fn parse(content: &str, path: &Path, base_dir: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let uses_default_command = file.command.is_none();
        let command = file
            .command
            .unwrap_or_else(|| DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect());
        if command.first().is_none_or(|p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyCommand);
        }

        let working_dir = match file.working_dir {
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };
        let resolve = |p: PathBuf| working_dir.join(p);

        let entry_point = file.entry_point.or_else(|| {
            uses_default_command.then(|| PathBuf::from(DEFAULT_ENTRY_POINT))
        });

        let layout = LogLayout::new(
            resolve(file.log_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))),
            file.log_prefix
                .unwrap_or_else(|| DEFAULT_LOG_PREFIX.to_string()),
            file.log_extension
                .unwrap_or_else(|| DEFAULT_LOG_EXTENSION.to_string()),
            file.latest_name
                .unwrap_or_else(|| DEFAULT_LATEST_NAME.to_string()),
        );
        validate_layout(&layout)?;

        let retention = match (file.retention.keep_last, file.retention.max_age_days) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingRetention),
            (Some(0), None) => return Err(ConfigError::ZeroRetention("keep_last")),
            (None, Some(0)) => return Err(ConfigError::ZeroRetention("max_age_days")),
            (Some(n), None) => RetentionPolicy::KeepLast(n),
            (None, Some(days)) => days
                .checked_mul(SECS_PER_DAY)
                .map(|secs| RetentionPolicy::MaxAge(Duration::from_secs(secs)))
                .ok_or(ConfigError::RetentionTooLarge(days))?,
            (None, None) => RetentionPolicy::KeepLast(DEFAULT_KEEP_LAST),
        };

        let cadence = file
            .schedule
            .cadence
            .unwrap_or_else(|| DEFAULT_CADENCE.to_string());
        validate_cadence(&cadence)?;
        let schedule = ScheduleConfig {
            cadence,
            runner_script: resolve(
                file.schedule
                    .runner_script
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNNER_SCRIPT)),
            ),
        };

        Ok(Self {
            config_path: None,
            command,
            env_file: resolve(file.env_file.unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE))),
            required_env: file
                .required_env
                .unwrap_or_else(|| vec![DEFAULT_REQUIRED_ENV.to_string()]),
            entry_point: entry_point.map(resolve),
            working_dir,
            layout,
            retention,
            schedule,
        })
    }

    /// The program to execute (first element of `command`).
    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }

    /// Command line rendered for banners and diagnostics.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(path).map_err(|source| ConfigError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_layout(layout: &LogLayout) -> Result<(), ConfigError> {
    if layout.prefix().is_empty() {
        return Err(ConfigError::InvalidLogName(
            "log_prefix must not be empty".to_string(),
        ));
    }
    for (field, value) in [
        ("log_prefix", layout.prefix()),
        ("log_extension", layout.extension()),
    ] {
        if value.contains('/') {
            return Err(ConfigError::InvalidLogName(format!(
                "{} must not contain '/': {}",
                field, value
            )));
        }
    }
    let latest_name = layout.latest_name();
    if latest_name.is_empty() || latest_name.starts_with('.') || latest_name.contains('/') {
        return Err(ConfigError::InvalidLogName(format!(
            "latest_name must be a plain file name: {}",
            latest_name
        )));
    }
    Ok(())
}

fn validate_cadence(cadence: &str) -> Result<(), ConfigError> {
    let trimmed = cadence.trim();
    let valid = if trimmed.starts_with('@') {
        trimmed.len() > 1 && !trimmed.contains(char::is_whitespace)
    } else {
        trimmed.split_whitespace().count() == 5
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidCadence(cadence.to_string()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
