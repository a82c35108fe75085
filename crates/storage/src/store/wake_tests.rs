// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::Applied;
use fray_core::{Envelope, Event, MachineId};

fn env(seq: u64, event: Event) -> Envelope {
    Envelope::new(1_700_000_000 + seq as i64, MachineId::new("m1"), seq, event)
}

fn condition(guid: &str, wake_type: WakeType) -> WakeCondition {
    WakeCondition {
        guid: WakeId::new(guid),
        agent_id: AgentId::new("alice"),
        set_by: AgentId::new("bob"),
        wake_type,
        pattern: Some("deploy .*".to_string()),
        on_agents: vec![AgentId::new("bob")],
        in_thread: None,
        after_ms: 120_000,
        use_router: false,
        prompt_text: None,
        poll_interval_ms: 90_000,
        last_polled_at: 0,
        persist_mode: PersistMode::Persist,
        paused: false,
        created_at: 1_700_000_000,
        expires_at: None,
    }
}

#[test]
fn set_and_read_back() {
    let store = Store::open_in_memory().unwrap();
    let cond = condition("wake-000000000001", WakeType::Pattern);
    store
        .apply_envelope(&env(1, Event::WakeConditionSet { condition: cond.clone() }))
        .unwrap();

    let fetched = store.get_wake_condition("wake-000000000001").unwrap();
    assert_eq!(fetched.pattern, cond.pattern);
    assert_eq!(fetched.on_agents, cond.on_agents);
    assert_eq!(fetched.persist_mode, PersistMode::Persist);
}

#[test]
fn pause_resume_delete() {
    let store = Store::open_in_memory().unwrap();
    store
        .apply_envelope(&env(
            1,
            Event::WakeConditionSet {
                condition: condition("wake-000000000001", WakeType::OnMention),
            },
        ))
        .unwrap();

    store
        .apply_envelope(&env(
            2,
            Event::WakeConditionPaused {
                id: WakeId::new("wake-000000000001"),
            },
        ))
        .unwrap();
    assert!(store.get_wake_condition("wake-000000000001").unwrap().paused);
    assert!(store.active_wake_conditions().unwrap().is_empty());

    store
        .apply_envelope(&env(
            3,
            Event::WakeConditionResumed {
                id: WakeId::new("wake-000000000001"),
            },
        ))
        .unwrap();
    assert_eq!(store.active_wake_conditions().unwrap().len(), 1);

    let outcome = store
        .apply_envelope(&env(
            4,
            Event::WakeConditionDeleted {
                id: WakeId::new("wake-000000000001"),
            },
        ))
        .unwrap();
    assert_eq!(outcome, Applied::Changed);
    assert!(store
        .list_wake_conditions(Some("alice"))
        .unwrap()
        .is_empty());
}

#[test]
fn reset_rearms_timer() {
    let store = Store::open_in_memory().unwrap();
    let mut cond = condition("wake-000000000001", WakeType::After);
    cond.expires_at = Some(1_700_000_100);
    store
        .apply_envelope(&env(1, Event::WakeConditionSet { condition: cond }))
        .unwrap();

    // Reset at ts 1_700_000_050 re-arms to ts + after_ms/1000
    store
        .apply_envelope(&env(
            50,
            Event::WakeConditionReset {
                id: WakeId::new("wake-000000000001"),
            },
        ))
        .unwrap();
    let fetched = store.get_wake_condition("wake-000000000001").unwrap();
    assert_eq!(fetched.expires_at, Some(1_700_000_050 + 120));
}

#[test]
fn list_filters_by_agent() {
    let store = Store::open_in_memory().unwrap();
    store
        .apply_envelope(&env(
            1,
            Event::WakeConditionSet {
                condition: condition("wake-000000000001", WakeType::OnMention),
            },
        ))
        .unwrap();
    let mut other = condition("wake-000000000002", WakeType::OnMention);
    other.agent_id = AgentId::new("carol");
    store
        .apply_envelope(&env(2, Event::WakeConditionSet { condition: other }))
        .unwrap();

    assert_eq!(store.list_wake_conditions(None).unwrap().len(), 2);
    assert_eq!(store.list_wake_conditions(Some("alice")).unwrap().len(), 1);
}
