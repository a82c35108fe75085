// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn lock_is_exclusive() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("daemon.pid");

    let held = acquire_lock(&path).unwrap();
    let err = acquire_lock(&path).unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyRunning(_)));

    drop(held);
    assert!(acquire_lock(&path).is_ok());
}

#[test]
fn lock_records_pid() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("daemon.pid");
    let _held = acquire_lock(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content.trim().parse::<u32>().unwrap(),
        std::process::id()
    );
}

#[test]
fn config_requires_a_project() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(DaemonConfig::for_project(tmp.path()).is_err());

    std::fs::create_dir_all(tmp.path().join(".fray")).unwrap();
    let config = DaemonConfig::for_project(tmp.path()).unwrap();
    assert!(config.lock_path.ends_with(".fray/local/daemon.pid"));
}
