// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::log::MachineLog;
use crate::store::Store;
use fray_core::{AgentId, ChannelId, Event, Message, MessageId};

fn config() -> ProjectConfig {
    ProjectConfig::new(ChannelId::new("ch-000000000001"), "test")
}

fn message_event(id: &str, ts: i64, origin: &str, body: &str) -> Event {
    let mut message = Message::new(
        MessageId::new(id),
        ts,
        "room",
        AgentId::new("alice"),
        body,
    );
    message.origin = MachineId::new(origin);
    Event::MessageCreated { message }
}

fn seed_machine(paths: &FrayPaths, machine: &str, entries: &[(u64, i64, &str, &str)]) {
    let log = MachineLog::new(paths.machine_dir(machine));
    for (seq, ts, id, body) in entries {
        log.append(
            LogFile::Messages,
            &Envelope::new(
                *ts,
                MachineId::new(machine),
                *seq,
                message_event(id, *ts, machine, body),
            ),
        )
        .unwrap();
    }
}

#[test]
fn rebuild_is_deterministic() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = FrayPaths::new(tmp.path());
    seed_machine(
        &paths,
        "m1",
        &[(1, 100, "msg-a00000000001", "one"), (2, 300, "msg-a00000000002", "three")],
    );
    seed_machine(&paths, "m2", &[(1, 200, "msg-b00000000001", "two")]);

    rebuild(&paths, &config(), 1_700_000_000).unwrap();
    let first: Vec<String> = {
        let store = Store::open(&paths.db()).unwrap();
        store
            .list_all_messages()
            .unwrap()
            .iter()
            .map(|m| serde_json::to_string(m).unwrap())
            .collect()
    };

    rebuild(&paths, &config(), 1_700_000_099).unwrap();
    let second: Vec<String> = {
        let store = Store::open(&paths.db()).unwrap();
        store
            .list_all_messages()
            .unwrap()
            .iter()
            .map(|m| serde_json::to_string(m).unwrap())
            .collect()
    };

    assert_eq!(first, second);
    let bodies: Vec<String> = first
        .iter()
        .map(|json| serde_json::from_str::<Message>(json).unwrap().body)
        .collect();
    assert_eq!(bodies, vec!["one", "two", "three"]);
}

#[test]
fn merge_is_commutative_across_machines() {
    // Same events, machines seeded in either order: directory listing is
    // sorted, so the fold sees one canonical order either way
    let build = |machines: &[(&str, &[(u64, i64, &str, &str)])]| -> Vec<String> {
        let tmp = tempfile::tempdir().unwrap();
        let paths = FrayPaths::new(tmp.path());
        for (machine, entries) in machines {
            seed_machine(&paths, machine, entries);
        }
        rebuild(&paths, &config(), 0).unwrap();
        let store = Store::open(&paths.db()).unwrap();
        store
            .list_all_messages()
            .unwrap()
            .iter()
            .map(|m| m.id.to_string())
            .collect()
    };

    let m1: &[(u64, i64, &str, &str)] = &[(1, 100, "msg-a00000000001", "x")];
    let m2: &[(u64, i64, &str, &str)] = &[(1, 100, "msg-b00000000001", "y")];

    let forward = build(&[("m1", m1), ("m2", m2)]);
    let reverse = build(&[("m2", m2), ("m1", m1)]);
    assert_eq!(forward, reverse);
}

#[test]
fn sticky_tombstone_survives_rebuild_reordering() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = FrayPaths::new(tmp.path());

    // m1 deletes at ts 100; m2 posts the same guid later at ts 200
    let log1 = MachineLog::new(paths.machine_dir("m1"));
    log1.append(
        LogFile::Messages,
        &Envelope::new(
            50,
            MachineId::new("m1"),
            1,
            message_event("msg-x00000000001", 50, "m1", "original"),
        ),
    )
    .unwrap();
    log1.append(
        LogFile::Messages,
        &Envelope::new(
            100,
            MachineId::new("m1"),
            2,
            Event::MessageDeleted {
                id: MessageId::new("msg-x00000000001"),
                by: AgentId::new("alice"),
            },
        ),
    )
    .unwrap();
    seed_machine(&paths, "m2", &[(1, 200, "msg-x00000000001", "resurrected?")]);

    rebuild(&paths, &config(), 0).unwrap();
    let store = Store::open(&paths.db()).unwrap();
    assert!(store.try_get_message("msg-x00000000001").unwrap().is_none());
}

#[test]
fn collisions_recorded_to_incident_file() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = FrayPaths::new(tmp.path());
    seed_machine(&paths, "m1", &[(1, 100, "msg-x00000000001", "mine")]);
    seed_machine(&paths, "m2", &[(1, 150, "msg-x00000000001", "also mine")]);

    let report = rebuild(&paths, &config(), 1_700_000_000).unwrap();
    assert_eq!(report.collisions, vec!["msg-x00000000001"]);

    let content = std::fs::read_to_string(paths.collisions()).unwrap();
    assert!(content.contains("msg-x00000000001"));

    // First write wins; the collision does not clobber it
    let store = Store::open(&paths.db()).unwrap();
    assert_eq!(store.get_message("msg-x00000000001").unwrap().body, "mine");
}

#[test]
fn machine_alias_rewrites_origin() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = FrayPaths::new(tmp.path());
    seed_machine(&paths, "old-laptop", &[(1, 100, "msg-a00000000001", "hi")]);

    let mut config = config();
    config
        .machine_aliases
        .insert("old-laptop".to_string(), "laptop".to_string());

    rebuild(&paths, &config, 0).unwrap();
    let store = Store::open(&paths.db()).unwrap();
    let message = store.get_message("msg-a00000000001").unwrap();
    assert_eq!(message.origin.as_str(), "laptop");
}

#[test]
fn unknown_records_do_not_error() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = FrayPaths::new(tmp.path());
    let dir = paths.machine_dir("m1");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("messages.jsonl"),
        "{\"type\":\"mlld_hook\",\"ts\":1,\"origin\":\"m1\",\"seq\":1}\n",
    )
    .unwrap();

    let report = rebuild(&paths, &config(), 0).unwrap();
    assert_eq!(report.records, 1);
    assert!(report.collisions.is_empty());
}

#[test]
fn needs_rebuild_tracks_mtimes() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = FrayPaths::new(tmp.path());
    seed_machine(&paths, "m1", &[(1, 100, "msg-a00000000001", "hi")]);

    assert!(needs_rebuild(&paths));
    rebuild(&paths, &config(), 0).unwrap();
    assert!(!needs_rebuild(&paths));
}
