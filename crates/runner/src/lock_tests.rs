// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn acquire_writes_pid_and_marks_held() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join(".hourly.lock");

    let lock = RunLock::try_acquire(&path).unwrap().unwrap();
    assert_eq!(lock.path(), path);
    assert_eq!(RunLock::holder_pid(&path), Some(std::process::id()));
    assert!(RunLock::is_held(&path));
}

#[test]
fn second_acquire_is_contended() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".hourly.lock");

    let _held = RunLock::try_acquire(&path).unwrap().unwrap();
    assert!(RunLock::try_acquire(&path).unwrap().is_none());
    // A failed attempt must not wipe the holder's PID.
    assert_eq!(RunLock::holder_pid(&path), Some(std::process::id()));
}

#[test]
fn drop_releases_lock() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".hourly.lock");

    drop(RunLock::try_acquire(&path).unwrap().unwrap());
    assert!(!RunLock::is_held(&path));
    assert!(RunLock::try_acquire(&path).unwrap().is_some());
}

#[test]
fn missing_lock_file_is_not_held() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".hourly.lock");
    assert!(!RunLock::is_held(&path));
    assert_eq!(RunLock::holder_pid(&path), None);
}
