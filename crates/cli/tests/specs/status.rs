//! `hourly status` specs

use crate::prelude::*;

#[test]
fn status_before_any_run() {
    let project = Project::with_job("true");

    project
        .hourly()
        .args(&["status"])
        .passes()
        .stdout_has("Runner: idle")
        .stdout_has("Last run: none recorded");
}

#[test]
fn status_reports_last_run() {
    let project = Project::with_job("exit 4");
    project.hourly().args(&["run", "-q"]).fails().exits_with(4);

    let run = project.hourly().args(&["status", "-o", "json"]).passes();
    let report = run.json();

    assert_eq!(report["running"], false);
    assert_eq!(report["retained_logs"], 1);
    assert_eq!(report["last_run"]["status"], "failed");
    assert_eq!(report["last_run"]["succeeded"], false);
    assert_eq!(report["last_run"]["exit_code"], 4);

    project
        .hourly()
        .args(&["status"])
        .passes()
        .stdout_has("Last run: FAILED")
        .stdout_has("  exit code: 4\n");
}
