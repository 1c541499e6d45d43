//! `hourly install` specs

use crate::prelude::*;

fn install_env(project: &Project, builder: CliBuilder) -> CliBuilder {
    builder
        .env("HOURLY_SCHEDULE_TABLE", project.path().join("crontab"))
        .env("HOURLY_BIN", hourly_binary())
}

fn entries(project: &Project) -> usize {
    let runner = project.path().join("run_hourly.sh").display().to_string();
    project
        .read("crontab")
        .lines()
        .filter(|l| l.split_whitespace().any(|t| t == runner))
        .count()
}

fn job_project() -> Project {
    let project = Project::with_config(
        "command = [\"sh\", \"batch_scheduler.py\"]\nentry_point = \"batch_scheduler.py\"\nrequired_env = [\"API_KEY\"]\n",
    );
    project.file("batch_scheduler.py", "echo batch ran\n");
    project
}

#[test]
fn install_twice_registers_once() {
    let project = job_project();
    project.file("crontab", "MAILTO=ops@example.com\n");

    install_env(&project, project.hourly())
        .args(&["install"])
        .passes()
        .stdout_has("INSTALLED (stage: verified)");
    install_env(&project, project.hourly())
        .args(&["install"])
        .passes()
        .stdout_has("already registered");

    assert_eq!(entries(&project), 1);
    assert!(project.read("crontab").starts_with("MAILTO=ops@example.com\n"));
    assert!(project.read("run_hourly.sh").contains(" run --quiet --config "));
}

#[test]
fn failed_prerequisites_exit_1_and_report_each() {
    let project = job_project();
    std::fs::remove_file(project.path().join(".env")).unwrap();
    std::fs::remove_file(project.path().join("batch_scheduler.py")).unwrap();

    install_env(&project, project.hourly())
        .args(&["install"])
        .fails()
        .exits_with(1)
        .stdout_has("configuration file not found")
        .stdout_has("entry point not found")
        .stdout_has("FAILED (stage: not started)");

    assert!(!project.path().join("run_hourly.sh").exists());
    assert!(!project.path().join("crontab").exists());
}

#[test]
fn smoke_test_runs_the_job_through_the_runner() {
    let project = job_project();

    let run = install_env(&project, project.hourly())
        .args(&["install", "--smoke-test", "-o", "json"])
        .passes();
    let report = run.json();

    assert_eq!(report["stage"], "verified");
    assert_eq!(report["smoke_test"]["exit_code"], 0);
    assert!(project.read("logs/latest.log").contains("batch ran\n"));
}
