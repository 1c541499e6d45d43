// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod install;
pub mod prune;
pub mod run;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::Result;
use hourly_core::config::DEFAULT_CONFIG_FILE;
use hourly_core::{RunnerConfig, EXIT_CONFIG};

use crate::exit_error::ExitError;

/// Config file to load: `--config`, then `HOURLY_CONFIG`.
///
/// `None` means the optional `./hourly.toml`.
pub fn explicit_config_path(flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(crate::env::config_path)
}

/// Load the runner configuration.
///
/// A config file named explicitly must exist; the default one is optional.
pub fn load_config(flag: Option<&Path>) -> Result<RunnerConfig> {
    let loaded = match explicit_config_path(flag) {
        Some(path) => RunnerConfig::load(&path),
        None => RunnerConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE)),
    };
    loaded.map_err(|e| ExitError::new(EXIT_CONFIG, e.to_string()).into())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
