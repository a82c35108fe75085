// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fray_core::{AgentPatch, Envelope, Event, JobId, MachineId};

fn env(seq: u64, event: Event) -> Envelope {
    Envelope::new(1_700_000_000 + seq as i64, MachineId::new("m1"), seq, event)
}

fn register(store: &Store, seq: u64, agent_id: &str, managed: bool) {
    let mut agent = AgentRecord::new(
        format!("usr-{seq:012}"),
        AgentId::new(agent_id),
        1_700_000_000,
    );
    agent.managed = managed;
    if managed {
        agent.invoke = Some(InvokeConfig::new("claude"));
    }
    store
        .apply_envelope(&env(seq, Event::AgentRegistered { agent }))
        .unwrap();
}

#[test]
fn managed_filter() {
    let store = Store::open_in_memory().unwrap();
    register(&store, 1, "alice", true);
    register(&store, 2, "bob", false);

    let managed = store.managed_agents().unwrap();
    assert_eq!(managed.len(), 1);
    assert_eq!(managed[0].agent_id, "alice");
    assert_eq!(
        managed[0].invoke.as_ref().unwrap().driver,
        "claude"
    );
}

#[test]
fn base_matching_includes_subagents_and_workers() {
    let store = Store::open_in_memory().unwrap();
    register(&store, 1, "alice", true);
    register(&store, 2, "alice.1", true);
    register(&store, 3, "alice[ab12-0]", true);
    register(&store, 4, "alicia", true);

    let matched = store.agents_matching_base("alice").unwrap();
    let ids: Vec<&str> = matched.iter().map(|a| a.agent_id.as_str()).collect();
    assert_eq!(ids, vec!["alice", "alice.1", "alice[ab12-0]"]);
}

#[test]
fn active_workers_excludes_departed() {
    let store = Store::open_in_memory().unwrap();
    store
        .apply_envelope(&env(
            1,
            Event::JobWorkerJoined {
                job: JobId::new("job-ab12cd34ef56"),
                agent_id: AgentId::new("dev[ab12-0]"),
                idx: 0,
            },
        ))
        .unwrap();
    store
        .apply_envelope(&env(
            2,
            Event::JobWorkerJoined {
                job: JobId::new("job-ab12cd34ef56"),
                agent_id: AgentId::new("dev[ab12-1]"),
                idx: 1,
            },
        ))
        .unwrap();
    store
        .apply_envelope(&env(
            3,
            Event::JobWorkerLeft {
                job: JobId::new("job-ab12cd34ef56"),
                agent_id: AgentId::new("dev[ab12-1]"),
            },
        ))
        .unwrap();

    let active = store.active_workers_for_base("dev").unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].agent_id, "dev[ab12-0]");
}

#[test]
fn bye_and_back_via_patch() {
    let store = Store::open_in_memory().unwrap();
    register(&store, 1, "alice", true);

    store
        .apply_envelope(&env(
            2,
            Event::AgentUpdated {
                id: AgentId::new("alice"),
                patch: AgentPatch {
                    left_at: Some(1_700_000_100),
                    ..AgentPatch::default()
                },
            },
        ))
        .unwrap();
    assert!(store.get_agent("alice").unwrap().is_away());

    store
        .apply_envelope(&env(
            3,
            Event::AgentUpdated {
                id: AgentId::new("alice"),
                patch: AgentPatch {
                    returned: true,
                    ..AgentPatch::default()
                },
            },
        ))
        .unwrap();
    assert!(!store.get_agent("alice").unwrap().is_away());
}

#[test]
fn watermark_patch() {
    let store = Store::open_in_memory().unwrap();
    register(&store, 1, "alice", true);

    store
        .apply_envelope(&env(
            2,
            Event::AgentUpdated {
                id: AgentId::new("alice"),
                patch: AgentPatch {
                    mention_watermark: Some("msg-000000000042".to_string()),
                    ..AgentPatch::default()
                },
            },
        ))
        .unwrap();
    assert_eq!(
        store.get_agent("alice").unwrap().mention_watermark.unwrap(),
        "msg-000000000042"
    );
}
