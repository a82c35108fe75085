// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    offline = { Presence::Offline, true, false },
    idle = { Presence::Idle, true, false },
    spawning = { Presence::Spawning, false, true },
    active = { Presence::Active, false, true },
    prompting = { Presence::Prompting, false, true },
    prompted = { Presence::Prompted, false, true },
    error = { Presence::Error, false, true },
)]
fn presence_classification(presence: Presence, launchable: bool, busy: bool) {
    assert_eq!(presence.is_launchable(), launchable);
    assert_eq!(presence.is_busy(), busy);
}

#[test]
fn empty_presence_deserializes_offline() {
    let presence: Presence = serde_json::from_str(r#""""#).unwrap();
    assert_eq!(presence, Presence::Offline);
}

#[test]
fn presence_round_trip() {
    for presence in [
        Presence::Offline,
        Presence::Spawning,
        Presence::Active,
        Presence::Prompting,
        Presence::Prompted,
        Presence::Idle,
        Presence::Error,
    ] {
        let json = serde_json::to_string(&presence).unwrap();
        let parsed: Presence = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, presence);
    }
}

#[test]
fn unknown_presence_rejected() {
    assert!(serde_json::from_str::<Presence>(r#""zombie""#).is_err());
}

#[test]
fn record_defaults() {
    let rec = AgentRecord::new("usr-000000000001", AgentId::new("alice"), 1_700_000_000);
    assert!(!rec.managed);
    assert_eq!(rec.presence, Presence::Offline);
    assert!(!rec.is_away());
    assert_eq!(rec.last_seen, rec.registered_at);
}

#[test]
fn invoke_config_minimal_json() {
    let cfg = InvokeConfig::new("claude");
    let json = serde_json::to_value(&cfg).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(obj["driver"], "claude");
    assert_eq!(obj["prompt_delivery"], "stdin");
    assert!(!obj.contains_key("model"));
    assert!(!obj.contains_key("args"));
}
