// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::project::{init_project, InitOutcome};
use crate::store::NewMessage;
use fray_core::{SequentialIdGen, ThreadKind, ThreadPatch};

const T0: i64 = 1_700_000_000;

struct Fixture {
    project: Project,
    id_gen: SequentialIdGen,
    thread_guid: String,
    ids: Vec<MessageId>,
}

/// Thread with 100 messages: index n posted at T0+n.
fn fixture() -> (tempfile::TempDir, Fixture) {
    let tmp = tempfile::tempdir().unwrap();
    let id_gen = SequentialIdGen::new();
    assert_eq!(
        init_project(tmp.path(), "laptop", "chan", &id_gen, T0).unwrap(),
        InitOutcome::CreatedFresh
    );
    let mut project = Project::discover(tmp.path(), T0).unwrap();

    let thread = project
        .create_thread(
            "work/log",
            None,
            ThreadKind::Standard,
            &AgentId::new("alice"),
            &id_gen,
            T0,
        )
        .unwrap();
    let thread_guid = thread.guid.0.clone();

    let mut ids: Vec<fray_core::MessageId> = Vec::new();
    for n in 0..100i64 {
        let author = if n % 2 == 0 { "alice" } else { "bob" };
        let mut draft = NewMessage::in_home(&thread_guid, AgentId::new(author), format!("m{n}"));
        // msg 99 replies to msg 40
        if n == 99 {
            draft.reply_to = Some(ids[40].0.clone());
        }
        let message = project.post_message(draft, &id_gen, T0 + 1 + n).unwrap();
        ids.push(message.id);
    }

    (
        tmp,
        Fixture {
            project,
            id_gen,
            thread_guid,
            ids,
        },
    )
}

#[test]
fn prune_preserves_anchors_faves_and_reply_chains() {
    let (_tmp, mut fx) = fixture();

    // msg-50 is the anchor; msg-80 faved by alice
    fx.project
        .update_thread(
            &ThreadRef(fx.thread_guid.clone()),
            ThreadPatch {
                anchor_message_guid: Some(fx.ids[50].clone()),
                ..ThreadPatch::default()
            },
            T0 + 200,
        )
        .unwrap();
    fx.project
        .fave(fx.ids[80].as_str(), &AgentId::new("alice"), false, T0 + 201)
        .unwrap();

    // Quiesce so the guardrail passes without force
    fx.project.rebuild(T0 + 210).unwrap();

    let report = prune(
        &mut fx.project,
        &ThreadRef(fx.thread_guid.clone()),
        &PruneOptions {
            keep: 10,
            ..PruneOptions::default()
        },
        &fx.id_gen,
        T0 + 300,
    )
    .unwrap();

    let remaining = fx.project.store().home_messages(&fx.thread_guid).unwrap();
    let remaining_ids: Vec<&str> = remaining.iter().map(|m| m.id.as_str()).collect();

    // Last 10 (90..=99), plus reply ancestor 40, anchor 50, fave 80,
    // plus the synthesized tombstone
    for idx in 90..100 {
        assert!(remaining_ids.contains(&fx.ids[idx].as_str()), "missing tail {idx}");
    }
    assert!(remaining_ids.contains(&fx.ids[40].as_str()), "reply ancestor dropped");
    assert!(remaining_ids.contains(&fx.ids[50].as_str()), "anchor dropped");
    assert!(remaining_ids.contains(&fx.ids[80].as_str()), "fave dropped");
    assert_eq!(remaining.len(), 14);

    let tombstone_id = report.tombstone.unwrap();
    let tombstone = fx.project.store().get_message(tombstone_id.as_str()).unwrap();
    assert!(tombstone.is_tombstone());
    assert_eq!(tombstone.from_agent, "system");
    assert!(tombstone.body.starts_with("pruned: 87 messages between @alice, @bob from #"));
    assert!(tombstone.body.contains(fx.ids[0].as_str()));
    assert!(tombstone.body.contains(report.last_pruned.unwrap().as_str()));
}

#[test]
fn prune_archives_removed_records() {
    let (_tmp, mut fx) = fixture();
    fx.project.rebuild(T0 + 210).unwrap();

    prune(
        &mut fx.project,
        &ThreadRef(fx.thread_guid.clone()),
        &PruneOptions {
            keep: 5,
            ..PruneOptions::default()
        },
        &fx.id_gen,
        T0 + 300,
    )
    .unwrap();

    // keep 5 retains 95..=99 plus reply ancestor 40: 94 records archived
    let history = std::fs::read_to_string(fx.project.paths().history()).unwrap();
    let lines: Vec<&str> = history.lines().collect();
    assert_eq!(lines.len(), 94);
    assert!(lines[0].contains(fx.ids[0].as_str()));
}

#[test]
fn prune_repairs_watermarks_into_pruned_range() {
    let (_tmp, mut fx) = fixture();

    let mut agent = fray_core::AgentRecord::new("usr-x00000000001", AgentId::new("carol"), T0);
    agent.managed = true;
    agent.mention_watermark = Some(fx.ids[3].0.clone());
    fx.project.register_agent(agent, T0 + 250).unwrap();

    fx.project.rebuild(T0 + 260).unwrap();

    let report = prune(
        &mut fx.project,
        &ThreadRef(fx.thread_guid.clone()),
        &PruneOptions {
            keep: 10,
            ..PruneOptions::default()
        },
        &fx.id_gen,
        T0 + 300,
    )
    .unwrap();

    let carol = fx.project.store().get_agent("carol").unwrap();
    assert_eq!(
        carol.mention_watermark.as_deref(),
        Some(report.tombstone.unwrap().as_str())
    );
}

#[test]
fn prune_guard_rejects_unquiesced_tree() {
    let (_tmp, mut fx) = fixture();
    // Posts happened after the last manifest write at open-time rebuild

    let err = prune(
        &mut fx.project,
        &ThreadRef(fx.thread_guid.clone()),
        &PruneOptions::default(),
        &fx.id_gen,
        T0 + 300,
    )
    .unwrap_err();
    assert!(matches!(err, StorageError::GuardRejection(_)));
}

#[test]
fn prune_noop_when_everything_retained() {
    let (_tmp, mut fx) = fixture();
    fx.project.rebuild(T0 + 210).unwrap();

    let report = prune(
        &mut fx.project,
        &ThreadRef(fx.thread_guid.clone()),
        &PruneOptions {
            keep: 1000,
            ..PruneOptions::default()
        },
        &fx.id_gen,
        T0 + 300,
    )
    .unwrap();
    assert_eq!(report.pruned, 0);
    assert!(report.tombstone.is_none());
}

#[test]
fn prune_all_keeps_only_protected() {
    let (_tmp, mut fx) = fixture();
    fx.project
        .fave(fx.ids[7].as_str(), &AgentId::new("bob"), false, T0 + 200)
        .unwrap();
    fx.project.rebuild(T0 + 210).unwrap();

    prune(
        &mut fx.project,
        &ThreadRef(fx.thread_guid.clone()),
        &PruneOptions {
            keep: 0,
            prune_all: true,
            ..PruneOptions::default()
        },
        &fx.id_gen,
        T0 + 300,
    )
    .unwrap();

    let remaining = fx.project.store().home_messages(&fx.thread_guid).unwrap();
    // Fave + its reply-chain (none) + tombstone
    let ids: Vec<&str> = remaining.iter().map(|m| m.id.as_str()).collect();
    assert!(ids.contains(&fx.ids[7].as_str()));
    assert_eq!(remaining.len(), 2);
}
