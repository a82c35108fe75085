// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-facing scenarios: durability, rebuild determinism, sticky
//! tombstones, prune integrity.

use crate::specs::prelude::*;
use fray_core::address::parse_address;
use fray_core::{AgentId, Clock, ThreadKind, ThreadPatch, HOME_ROOM};
use fray_storage::{prune, NewMessage, Project, PruneOptions, ThreadRef};

// Invariant 1: a successful post survives losing the cache entirely
#[test]
fn post_survives_process_kill() {
    let mut world = world();
    world.register_human("bob");
    let message = world.post(HOME_ROOM, "bob", "must survive");

    let db = world.supervisor.project().paths().db().to_path_buf();
    let root = world.tmp.path().to_path_buf();
    let ts = world.clock.unix_ts();
    drop(world.supervisor);
    std::fs::remove_file(&db).expect("drop cache");

    let project = Project::discover(&root, ts).expect("reopen");
    let recovered = project
        .store()
        .get_message(message.id.as_str())
        .expect("recovered");
    assert_eq!(recovered.body, "must survive");
    assert_eq!(recovered.ts, message.ts);
}

// S6 / invariant 2: two rebuilds yield byte-equal query results
#[test]
fn s6_rebuild_idempotence() {
    let mut world = world();
    world.register_human("bob");
    world.register_managed("alice");
    for n in 0..10 {
        world.post(HOME_ROOM, "bob", &format!("message {n}"));
    }

    let snapshot = |project: &Project| -> String {
        let messages = project.store().list_all_messages().expect("list");
        serde_json::to_string(&messages).expect("serialize")
    };

    let ts = world.clock.unix_ts();
    world.project().rebuild(ts).expect("first rebuild");
    let first = snapshot(world.supervisor.project());

    world.project().rebuild(ts + 60).expect("second rebuild");
    let second = snapshot(world.supervisor.project());

    assert_eq!(first, second);
}

// Invariant 4: a durable tombstone wins over later posts for the id
#[test]
fn sticky_tombstone_across_rebuilds() {
    let mut world = world();
    world.register_human("bob");
    let message = world.post(HOME_ROOM, "bob", "ephemeral");

    let ts = world.clock.unix_ts();
    world
        .project()
        .delete_message(message.id.as_str(), &AgentId::new("bob"), ts)
        .expect("delete");

    world.project().rebuild(ts + 1).expect("rebuild");
    assert!(world
        .supervisor
        .project()
        .store()
        .try_get_message(message.id.as_str())
        .expect("query")
        .is_none());
}

// S5 / invariant 6: prune keeps the tail, anchors, faves, and reply
// ancestors, and leaves a summarizing tombstone
#[test]
fn s5_prune_preserves_integrity() {
    let mut world = world();
    world.register_human("alice");
    world.register_human("bob");

    let ts = world.clock.unix_ts();
    let id_gen = world.id_gen.clone();
    let thread = world
        .project()
        .create_thread("work/long", None, ThreadKind::Standard, &AgentId::new("alice"), &id_gen, ts)
        .expect("thread");
    let home = thread.guid.0.clone();

    let mut ids: Vec<String> = Vec::new();
    for n in 0..100 {
        let author = if n % 2 == 0 { "alice" } else { "bob" };
        let body = format!("m{n}");
        if n == 99 {
            let mut draft = NewMessage::in_home(&home, AgentId::new(author), body);
            draft.reply_to = Some(ids[40].clone());
            world.clock.advance(std::time::Duration::from_secs(1));
            let ts = world.clock.unix_ts();
            let id_gen = world.id_gen.clone();
            let message = world.project().post_message(draft, &id_gen, ts).expect("post");
            ids.push(message.id.0.clone());
        } else {
            let message = world.post(&home, author, &body);
            ids.push(message.id.0.clone());
        }
    }

    let ts = world.clock.unix_ts();
    world
        .project()
        .update_thread(
            &ThreadRef(home.clone()),
            ThreadPatch {
                anchor_message_guid: Some(fray_core::MessageId::new(ids[50].clone())),
                ..ThreadPatch::default()
            },
            ts,
        )
        .expect("anchor");
    world
        .project()
        .fave(&ids[80], &AgentId::new("alice"), false, ts)
        .expect("fave");
    world.project().rebuild(ts).expect("quiesce");

    let id_gen = world.id_gen.clone();
    let report = prune(
        world.project(),
        &ThreadRef(home.clone()),
        &PruneOptions {
            keep: 10,
            ..PruneOptions::default()
        },
        &id_gen,
        ts + 10,
    )
    .expect("prune");

    let remaining = world
        .supervisor
        .project()
        .store()
        .home_messages(&home)
        .expect("list");
    let remaining_ids: Vec<&str> = remaining.iter().map(|m| m.id.as_str()).collect();

    for idx in 90..100 {
        assert!(remaining_ids.contains(&ids[idx].as_str()), "tail {idx} missing");
    }
    assert!(remaining_ids.contains(&ids[40].as_str()), "reply ancestor pruned");
    assert!(remaining_ids.contains(&ids[50].as_str()), "anchor pruned");
    assert!(remaining_ids.contains(&ids[80].as_str()), "fave pruned");

    let tombstone_id = report.tombstone.expect("tombstone");
    let tombstone = world
        .supervisor
        .project()
        .store()
        .get_message(tombstone_id.as_str())
        .expect("tombstone row");
    assert!(tombstone.is_tombstone());
    assert!(tombstone.body.contains(&ids[0]));
    assert!(tombstone
        .body
        .contains(report.last_pruned.expect("last").as_str()));

    // Every surviving reply still has its ancestor chain
    for message in &remaining {
        if let Some(parent) = &message.reply_to {
            assert!(
                remaining_ids.contains(&parent.as_str()),
                "dangling reply {}",
                message.id
            );
        }
    }
}

// Invariant 7: the address parser is total
#[test]
fn address_parser_totality() {
    let inputs = [
        "@alice",
        "@alice.1.fast",
        "@dev[ab12-0]@laptop#a7f",
        "",
        "@",
        "@@",
        "@1digit",
        "@a[short-0]",
        "not a mention",
        "@trailing junk",
    ];
    for input in inputs {
        match parse_address(input) {
            Ok(address) => assert!(!address.agent.is_empty()),
            Err(diagnostic) => assert!(diagnostic.position() <= input.len()),
        }
    }
}
