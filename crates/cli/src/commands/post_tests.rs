// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::context::{ENV_AGENT_ID, ENV_TRIGGER_HOME};
use fray_core::{AgentId, Clock, SystemClock, UlidGen};
use fray_storage::{init_project, Project};
use serial_test::serial;

fn args(body: &str) -> PostArgs {
    PostArgs {
        body: body.to_string(),
        home: HOME_ROOM.to_string(),
        reply_to: None,
        as_agent: Some("bob".to_string()),
        event: false,
        force: false,
    }
}

fn setup_project() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let clock = SystemClock;
    init_project(tmp.path(), "m1", "test", &UlidGen, clock.unix_ts()).unwrap();
    std::env::set_current_dir(tmp.path()).unwrap();
    std::env::remove_var(ENV_TRIGGER_HOME);
    std::env::remove_var(ENV_AGENT_ID);
    tmp
}

fn register_worker(tmp: &tempfile::TempDir, agent_id: &str) {
    let clock = SystemClock;
    let mut project = Project::discover(tmp.path(), clock.unix_ts()).unwrap();
    let mut record =
        fray_core::AgentRecord::new(format!("usr-{agent_id}"), AgentId::new(agent_id), clock.unix_ts());
    record.managed = true;
    record.is_ephemeral = true;
    project.register_agent(record, clock.unix_ts()).unwrap();
}

#[test]
#[serial]
fn post_prints_nothing_but_succeeds() {
    let _tmp = setup_project();
    run(args("hello room")).unwrap();
}

#[test]
#[serial]
fn ambiguous_worker_mention_rejected_without_side_effects() {
    let tmp = setup_project();
    register_worker(&tmp, "dev[ab12-0]");
    register_worker(&tmp, "dev[ab12-1]");

    let err = run(args("@dev hey")).unwrap_err();
    assert_eq!(err.code(), 1);
    assert!(err.to_string().contains("dev[ab12-0]"));

    // No message row was created
    let clock = SystemClock;
    let project = Project::discover(tmp.path(), clock.unix_ts()).unwrap();
    assert!(project.store().home_messages(HOME_ROOM).unwrap().is_empty());
}

#[test]
#[serial]
fn trigger_home_guard_requires_force() {
    let _tmp = setup_project();
    std::env::set_var(ENV_TRIGGER_HOME, "thrd-somewhere0001");

    let err = run(args("posting to the wrong place")).unwrap_err();
    assert_eq!(err.code(), 2);

    let mut forced = args("posting to the wrong place");
    forced.force = true;
    run(forced).unwrap();

    std::env::remove_var(ENV_TRIGGER_HOME);
}

#[test]
#[serial]
fn mentions_are_encoded_for_this_machine() {
    let tmp = setup_project();
    run(args("@alice take a look")).unwrap();

    let clock = SystemClock;
    let project = Project::discover(tmp.path(), clock.unix_ts()).unwrap();
    let messages = project.store().home_messages(HOME_ROOM).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].body, "@alice@m1 take a look");
    assert_eq!(messages[0].mentions, vec!["alice"]);
}
