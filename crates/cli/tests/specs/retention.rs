//! Retention specs

use crate::prelude::*;

#[test]
fn keep_last_two_after_three_runs() {
    let project = Project::with_job("date +%s%N");
    project.file(
        "hourly.toml",
        "command = [\"sh\", \"-c\", \"date +%s%N\"]\nrequired_env = []\n[retention]\nkeep_last = 2\n",
    );

    for _ in 0..3 {
        project.hourly().args(&["run", "-q"]).passes();
    }

    let logs = project.run_logs();
    assert_eq!(logs.len(), 2);
    let newest = std::fs::read_to_string(logs.last().unwrap()).unwrap();
    assert_eq!(newest, project.read("logs/latest.log"));
}

#[test]
fn prune_dry_run_then_prune() {
    let project = Project::with_config("command = [\"true\"]\nrequired_env = []\n[retention]\nkeep_last = 1\n");
    project.file("logs/batch_20261001_000000.log", "old");
    project.file("logs/batch_20261002_000000.log", "newer");
    project.file("logs/notes.txt", "not a run log");

    project
        .hourly()
        .args(&["prune", "--dry-run"])
        .passes()
        .stdout_has("Dry run, no changes made")
        .stdout_has("1 log(s) would be deleted, 1 kept");
    assert_eq!(project.run_logs().len(), 2);

    project
        .hourly()
        .args(&["prune"])
        .passes()
        .stdout_has("1 log(s) deleted, 1 kept");
    assert_eq!(project.run_logs().len(), 1);
    assert!(project.logs_dir().join("notes.txt").exists());
}
