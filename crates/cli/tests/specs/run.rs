//! `hourly run` specs
//!
//! The runner's exit code is the job's, and every run leaves a complete log.

use crate::prelude::*;
use yare::parameterized;

#[parameterized(
    success = { 0 },
    general_failure = { 1 },
    custom = { 3 },
    max = { 255 },
)]
fn exit_code_is_the_jobs(code: i32) {
    let project = Project::with_job(&format!("echo working; exit {}", code));

    project.hourly().args(&["run"]).output().exits_with(code);

    assert_eq!(project.run_logs().len(), 1);
}

#[test]
fn output_is_echoed_and_logged() {
    let project = Project::with_job("echo to-stdout; echo to-stderr >&2");

    project
        .hourly()
        .args(&["run"])
        .passes()
        .stdout_has("BATCH RUN STARTED")
        .stdout_has("to-stdout\nto-stderr\n")
        .stdout_has("status: SUCCESS");

    let log = std::fs::read_to_string(&project.run_logs()[0]).unwrap();
    assert!(log.contains("to-stdout\nto-stderr\n"));
    assert_eq!(log, project.read("logs/latest.log"));
}

#[test]
fn quiet_keeps_stdout_clean() {
    let project = Project::with_job("echo hidden");

    project
        .hourly()
        .args(&["run", "--quiet"])
        .passes()
        .stdout_eq("");

    assert!(project.read("logs/latest.log").contains("hidden\n"));
}

#[test]
fn failed_job_is_logged_with_both_banners() {
    let project = Project::with_job("echo 'Traceback: boom' >&2; exit 3");

    project.hourly().args(&["run", "-q"]).fails().exits_with(3);

    let log = project.read("logs/latest.log");
    assert!(log.contains("BATCH RUN STARTED"));
    assert!(log.contains("Traceback: boom"));
    assert!(log.contains("BATCH RUN FINISHED"));
    assert!(log.contains("status: FAILED"));
}

#[test]
fn json_report_describes_the_run() {
    let project = Project::with_job("echo quiet in json mode");

    let run = project.hourly().args(&["run", "-o", "json"]).passes();
    let report = run.json();

    assert_eq!(report["status"], "completed");
    assert_eq!(report["exit_code"], 0);
    assert!(report["log_path"]
        .as_str()
        .unwrap()
        .contains("/logs/batch_"));
    assert!(!run.stdout().contains("quiet in json mode\n"));
}

#[test]
fn runner_diagnostics_go_to_hourly_log() {
    let project = Project::with_job("exit 0");

    project.hourly().args(&["run", "-q"]).passes();

    assert!(project.read("logs/hourly.log").contains("run started"));
}

#[test]
fn config_flag_selects_another_directory() {
    let project = Project::with_job("pwd");
    let elsewhere = tempfile::tempdir().unwrap();
    let config = project.path().join("hourly.toml").display().to_string();

    cli()
        .pwd(elsewhere.path())
        .args(&["run", "-q", "--config", config.as_str()])
        .passes();

    assert_eq!(project.run_logs().len(), 1);
    let log = project.read("logs/latest.log");
    let cwd = project.path().canonicalize().unwrap();
    assert!(log.contains(&format!("{}\n", cwd.display())));
}
