// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for a run

use std::path::PathBuf;

use hourly_core::{EnvFileError, EXIT_CONFIG, EXIT_IO};
use thiserror::Error;

/// Problems detected before the job is started. Nothing has been written
/// when one of these is returned.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    EnvFile(#[from] EnvFileError),

    #[error("configuration file {path} is missing required keys: {keys}")]
    MissingKeys { path: PathBuf, keys: String },

    #[error("working directory does not exist: {0}")]
    WorkingDir(PathBuf),

    #[error("program not found or not executable: {0}")]
    ProgramNotFound(String),
}

/// Failures writing the run's log files
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create log file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to publish latest log {path}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read job output: {0}")]
    Read(#[source] std::io::Error),
}

/// Errors that end a run without a job exit code
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("failed to acquire run lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for job: {0}")]
    Wait(#[source] std::io::Error),
}

impl RunError {
    /// Process exit code the runner reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Configuration(_) => EXIT_CONFIG,
            RunError::Log(_) | RunError::Lock { .. } | RunError::Wait(_) => EXIT_IO,
        }
    }
}
