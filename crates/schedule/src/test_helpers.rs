// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the schedule crate.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use hourly_core::RunnerConfig;
use tempfile::TempDir;

/// Write an executable shell script.
pub(crate) fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// A fake `crontab` that keeps its table in `store`.
pub(crate) fn fake_crontab(dir: &Path, store: &Path) -> PathBuf {
    let program = dir.join("crontab");
    write_script(
        &program,
        &format!(
            r#"store='{}'
if [ "$1" = "-l" ]; then
  if [ -f "$store" ]; then cat "$store"; else echo "no crontab for tester" >&2; exit 1; fi
else
  cat > "$store"
fi"#,
            store.display()
        ),
    );
    program
}

/// A job directory ready to install: env file, entry point, fake binary.
pub(crate) struct InstallFixture {
    pub dir: TempDir,
    pub config: RunnerConfig,
    pub hourly_bin: PathBuf,
}

impl InstallFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "API_KEY=abc\n").unwrap();
        std::fs::write(dir.path().join("job.py"), "print('hi')\n").unwrap();
        let config_path = dir.path().join("hourly.toml");
        std::fs::write(
            &config_path,
            "command = [\"sh\", \"job.py\"]\nentry_point = \"job.py\"\nrequired_env = [\"API_KEY\"]\n",
        )
        .unwrap();
        let config = RunnerConfig::load(&config_path).unwrap();

        let hourly_bin = dir.path().join("bin/hourly");
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        write_script(
            &hourly_bin,
            &format!("echo \"$@\" > '{}'\nexit 0", dir.path().join("smoke.txt").display()),
        );

        Self {
            dir,
            config,
            hourly_bin,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
