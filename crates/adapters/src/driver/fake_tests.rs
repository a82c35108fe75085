// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn records_launch_specs() {
    let adapter = FakeDriverAdapter::new();
    let mut spec = LaunchSpec::new("alice", "claude");
    spec.trigger_home = "thrd-x".to_string();
    adapter.launch(&spec).unwrap();

    let launches = adapter.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].agent_id, "alice");
    assert_eq!(launches[0].trigger_home, "thrd-x");
}

#[test]
fn scripted_exit_via_complete() {
    let adapter = FakeDriverAdapter::new();
    let handle = adapter.launch(&LaunchSpec::new("alice", "claude")).unwrap();

    assert_eq!(adapter.try_wait(&handle).unwrap(), None);
    adapter.complete(&handle.session_id, 0);
    assert_eq!(adapter.try_wait(&handle).unwrap(), Some(0));
}

#[test]
fn stop_signal_marks_and_exits() {
    let adapter = FakeDriverAdapter::new();
    let handle = adapter.launch(&LaunchSpec::new("alice", "claude")).unwrap();
    adapter.signal_stop(&handle).unwrap();
    assert!(adapter.was_stop_signalled(&handle.session_id));
    assert_eq!(adapter.try_wait(&handle).unwrap(), Some(0));
}

#[test]
fn scripted_launch_failure() {
    let adapter = FakeDriverAdapter::new();
    adapter.fail_with("no such driver");
    assert!(adapter.launch(&LaunchSpec::new("alice", "claude")).is_err());
    assert_eq!(adapter.launch_count(), 0);
}
