// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    meta_root = { "meta", true },
    meta_notes = { "meta/alice/notes", true },
    standard = { "design/api", false },
    metallic = { "metallic", false },
)]
fn meta_detection(name: &str, expected: bool) {
    let thread = Thread::new(
        ThreadId::new("thrd-000000000001"),
        name,
        1_700_000_000,
        AgentId::new("alice"),
    );
    assert_eq!(thread.is_meta(), expected);
}

#[test]
fn defaults_open_standard() {
    let thread = Thread::new(
        ThreadId::new("thrd-000000000001"),
        "design/api",
        1_700_000_000,
        AgentId::new("alice"),
    );
    assert_eq!(thread.status, ThreadStatus::Open);
    assert_eq!(thread.kind, ThreadKind::Standard);
    assert_eq!(thread.last_activity_at, thread.created_at);
}

#[test]
fn status_wire_format() {
    let json = serde_json::to_string(&ThreadStatus::Archived).unwrap();
    assert_eq!(json, r#""archived""#);
    let json = serde_json::to_string(&ThreadKind::Knowledge).unwrap();
    assert_eq!(json, r#""knowledge""#);
}
