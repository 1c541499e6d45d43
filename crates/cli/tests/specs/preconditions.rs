//! Precondition specs
//!
//! A job that cannot start exits 78 and leaves no log behind.

use crate::prelude::*;

#[test]
fn missing_env_file_exits_78_without_logs() {
    let project = Project::with_job("touch ran");
    std::fs::remove_file(project.path().join(".env")).unwrap();

    project
        .hourly()
        .args(&["run"])
        .fails()
        .exits_with(78)
        .stderr_has("configuration file not found");

    assert!(!project.logs_dir().exists());
    assert!(!project.path().join("ran").exists());
}

#[test]
fn blank_required_key_exits_78() {
    let project = Project::with_job("true");
    project.file(".env", "API_KEY=\n");

    project
        .hourly()
        .args(&["run"])
        .fails()
        .exits_with(78)
        .stderr_has("missing required keys: API_KEY");

    assert!(!project.logs_dir().exists());
}

#[test]
fn unknown_program_exits_78() {
    let project = Project::with_config("command = [\"./batch_scheduler.py\", \"run-once\"]\nrequired_env = []\n");

    project
        .hourly()
        .args(&["run"])
        .fails()
        .exits_with(78)
        .stderr_has("program not found");

    assert!(!project.logs_dir().exists());
}

#[test]
fn missing_explicit_config_exits_78() {
    let project = Project::with_job("true");

    project
        .hourly()
        .args(&["run", "--config", "nope.toml"])
        .fails()
        .exits_with(78)
        .stderr_has("failed to read config");
}

#[test]
fn invalid_config_exits_78() {
    let project = Project::with_config("[retention]\nkeep_last = 0\n");

    project
        .hourly()
        .args(&["status"])
        .fails()
        .exits_with(78)
        .stderr_has("keep_last must be at least 1");
}
