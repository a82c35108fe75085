// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::driver::LaunchSpec;

fn spec(driver: &str) -> LaunchSpec {
    LaunchSpec::new("alice", driver)
}

#[test]
fn launch_missing_executable_errors() {
    let adapter = ProcessDriverAdapter::new();
    let err = adapter
        .launch(&spec("/nonexistent/driver/binary"))
        .unwrap_err();
    assert!(matches!(err, DriverError::Launch { .. }));
}

#[cfg(unix)]
#[test]
fn launch_and_wait_for_exit() {
    let adapter = ProcessDriverAdapter::new();
    let mut launch = spec("true");
    launch.prompt_delivery = fray_core::PromptDelivery::Args;
    launch.prompt = String::new();

    let handle = adapter.launch(&launch).unwrap();
    assert!(handle.pid.is_some());

    // Poll until the process exits
    let mut exit = None;
    for _ in 0..200 {
        if let Some(code) = adapter.try_wait(&handle).unwrap() {
            exit = Some(code);
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    assert_eq!(exit, Some(0));

    // Session is forgotten after reaping
    assert!(matches!(
        adapter.try_wait(&handle),
        Err(DriverError::UnknownSession(_))
    ));
}

#[cfg(unix)]
#[test]
fn stdin_delivery_pipes_prompt() {
    let adapter = ProcessDriverAdapter::new();
    let mut launch = spec("cat");
    launch.prompt = "wake up\n".to_string();

    let handle = adapter.launch(&launch).unwrap();
    let mut exit = None;
    for _ in 0..200 {
        if let Some(code) = adapter.try_wait(&handle).unwrap() {
            exit = Some(code);
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    // cat exits 0 once stdin closes
    assert_eq!(exit, Some(0));
}

#[cfg(unix)]
#[test]
fn kill_terminates_session() {
    let adapter = ProcessDriverAdapter::new();
    let mut launch = spec("sleep");
    launch.args = vec!["30".to_string()];
    launch.prompt_delivery = fray_core::PromptDelivery::Args;
    launch.prompt = String::new();

    let handle = adapter.launch(&launch).unwrap();
    assert!(adapter.try_wait(&handle).unwrap().is_none());

    adapter.kill(&handle).unwrap();
    let mut exited = false;
    for _ in 0..200 {
        if adapter.try_wait(&handle).unwrap().is_some() {
            exited = true;
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    assert!(exited);
}
