// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn defaults_match_hourly_batch_job() {
    let config = RunnerConfig::from_toml_str("", Path::new("/srv/batch")).unwrap();

    assert_eq!(config.command, vec!["python3", "batch_scheduler.py", "run-once"]);
    assert_eq!(config.working_dir, PathBuf::from("/srv/batch"));
    assert_eq!(config.env_file, PathBuf::from("/srv/batch/.env"));
    assert_eq!(
        config.entry_point,
        Some(PathBuf::from("/srv/batch/batch_scheduler.py"))
    );
    assert_eq!(config.required_env, vec!["AZURE_STORAGE_CONNECTION_STRING"]);
    assert_eq!(config.retention, RetentionPolicy::KeepLast(30));
    assert_eq!(config.schedule.cadence, "0 * * * *");
    assert_eq!(
        config.schedule.runner_script,
        PathBuf::from("/srv/batch/run_hourly.sh")
    );
    assert_eq!(config.layout.prefix(), "batch_");
    assert_eq!(config.layout.latest_path(), PathBuf::from("/srv/batch/logs/latest.log"));
}

#[test]
fn relative_paths_resolve_against_working_dir() {
    let config = RunnerConfig::from_toml_str(
        r#"
working_dir = "app"
env_file = "conf/.env"
log_dir = "/var/log/batch"
"#,
        Path::new("/srv"),
    )
    .unwrap();

    assert_eq!(config.working_dir, PathBuf::from("/srv/app"));
    assert_eq!(config.env_file, PathBuf::from("/srv/app/conf/.env"));
    assert_eq!(config.layout.dir(), Path::new("/var/log/batch"));
}

#[test]
fn custom_command_drops_default_entry_point() {
    let config =
        RunnerConfig::from_toml_str(r#"command = ["/usr/bin/env", "true"]"#, Path::new("/srv"))
            .unwrap();
    assert_eq!(config.program(), "/usr/bin/env");
    assert_eq!(config.args(), ["true".to_string()]);
    assert_eq!(config.command_line(), "/usr/bin/env true");
    assert!(config.entry_point.is_none());
}

#[test]
fn max_age_policy_in_days() {
    let config =
        RunnerConfig::from_toml_str("[retention]\nmax_age_days = 30\n", Path::new("/srv")).unwrap();
    assert_eq!(
        config.retention,
        RetentionPolicy::MaxAge(Duration::from_secs(30 * 86_400))
    );
    assert_eq!(config.retention.to_string(), "max age 30d");
}

#[test]
fn oversized_max_age_is_rejected() {
    let err = RunnerConfig::from_toml_str(
        "[retention]\nmax_age_days = 999999999999999999\n",
        Path::new("/srv"),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::RetentionTooLarge(999_999_999_999_999_999)));
}

#[test]
fn both_retention_bounds_are_rejected() {
    let err = RunnerConfig::from_toml_str(
        "[retention]\nkeep_last = 5\nmax_age_days = 30\n",
        Path::new("/srv"),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ConflictingRetention));
}

#[yare::parameterized(
    zero_count    = { "[retention]\nkeep_last = 0\n" },
    zero_age      = { "[retention]\nmax_age_days = 0\n" },
    empty_command = { "command = []\n" },
    blank_program = { "command = [\" \"]\n" },
    empty_prefix  = { "log_prefix = \"\"\n" },
    slash_prefix  = { "log_prefix = \"a/b\"\n" },
    hidden_latest = { "latest_name = \".latest\"\n" },
    short_cadence = { "[schedule]\ncadence = \"0 * *\"\n" },
    unknown_key   = { "colour = \"blue\"\n" },
    bad_toml      = { "command = \n" },
)]
fn invalid_config_is_rejected(content: &str) {
    assert!(RunnerConfig::from_toml_str(content, Path::new("/srv")).is_err());
}

#[yare::parameterized(
    hourly_cron  = { "0 * * * *" },
    every_15_min = { "*/15 * * * *" },
    macro_form   = { "@hourly" },
)]
fn valid_cadences(cadence: &str) {
    let content = format!("[schedule]\ncadence = \"{}\"\n", cadence);
    let config = RunnerConfig::from_toml_str(&content, Path::new("/srv")).unwrap();
    assert_eq!(config.schedule.cadence, cadence);
}

#[test]
fn load_records_config_path_and_roots_paths_at_its_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hourly.toml");
    std::fs::write(&path, "log_prefix = \"run_\"\n").unwrap();

    let config = RunnerConfig::load(&path).unwrap();
    assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    assert_eq!(config.layout.prefix(), "run_");
    assert!(config.working_dir.starts_with(dir.path()));
}

#[test]
fn load_missing_file_fails() {
    let dir = tempdir().unwrap();
    let err = RunnerConfig::load(&dir.path().join("hourly.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn load_or_default_without_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let config = RunnerConfig::load_or_default(&dir.path().join("hourly.toml")).unwrap();
    assert!(config.config_path.is_none());
    assert_eq!(config.retention, RetentionPolicy::KeepLast(30));
    assert!(config.env_file.starts_with(dir.path()));
}
