// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job configuration file (dotenv-style).
//!
//! The file is parsed into a [`JobEnv`] value that is handed to the child
//! process explicitly. The runner's own process environment is never touched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors reading the job configuration file
#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("configuration file not found: {0}")]
    Missing(PathBuf),

    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Key/value entries destined for the job's environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobEnv {
    vars: BTreeMap<String, String>,
}

impl JobEnv {
    /// Load the configuration file. A missing file is an error: the job
    /// cannot discover its credentials without it.
    pub fn load(path: &Path) -> Result<Self, EnvFileError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EnvFileError::Missing(path.to_path_buf()))
            }
            Err(source) => {
                return Err(EnvFileError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(Self {
            vars: parse_env(&content),
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Required keys that are absent or blank, in the order given.
    pub fn missing_keys<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|key| self.get(key).is_none_or(|v| v.trim().is_empty()))
            .map(String::as_str)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for JobEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Parse dotenv content string into key-value pairs.
///
/// Accepts an optional `export ` prefix and strips one level of matching
/// single or double quotes around the value.
fn parse_env(content: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        if let Some(eq_pos) = trimmed.find('=') {
            let key = trimmed[..eq_pos].trim().to_string();
            let value = unquote(trimmed[eq_pos + 1..].trim());
            if !key.is_empty() {
                map.insert(key, value.to_string());
            }
        }
    }
    map
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
#[path = "env_file_tests.rs"]
mod tests;
