// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the runner crate.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use hourly_core::{LogLayout, RunnerConfig};
use tempfile::TempDir;

/// A scratch working directory with a valid configuration file.
pub(crate) struct TestWorkspace {
    pub dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "BATCH_SIZE=10\nEMAIL_RECIPIENTS=ops@example.com\n",
        )
        .unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Config running `script` with `sh -c`, plus any extra TOML.
    pub fn config(&self, script: &str, extra: &str) -> RunnerConfig {
        let content = format!(
            "command = [\"sh\", \"-c\", '''{}''']\nrequired_env = [\"BATCH_SIZE\"]\n{}",
            script, extra
        );
        RunnerConfig::from_toml_str(&content, self.path()).unwrap()
    }

    /// Run log files currently on disk, sorted by name.
    pub fn entries(&self, config: &RunnerConfig) -> Vec<PathBuf> {
        let Ok(read_dir) = std::fs::read_dir(config.layout.dir()) else {
            return Vec::new();
        };
        let mut entries: Vec<PathBuf> = read_dir
            .filter_map(|e| e.ok())
            .filter(|e| config.layout.is_entry(&e.file_name().to_string_lossy()))
            .map(|e| e.path())
            .collect();
        entries.sort();
        entries
    }
}

/// Layout rooted at `dir` with the default naming.
pub(crate) fn layout(dir: &Path) -> LogLayout {
    LogLayout::new(dir, "batch_", ".log", "latest.log")
}

/// Create a run log named for `stamp` whose mtime is `age` ago.
pub(crate) fn aged_entry(dir: &Path, stamp: &str, age: Duration) -> PathBuf {
    let path = dir.join(format!("batch_{}.log", stamp));
    std::fs::write(&path, stamp).unwrap();
    set_age(&path, age);
    path
}

pub(crate) fn set_age(path: &Path, age: Duration) {
    let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}
