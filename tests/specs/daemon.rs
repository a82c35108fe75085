// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-facing scenarios: wake routing and the no-phantom-spawns
//! guarantee.

use crate::specs::prelude::*;
use fray_core::{AgentId, Clock, Presence, HOME_ROOM};
use fray_storage::NewMessage;
use std::time::Duration;

// S1: a direct address wakes an offline managed agent
#[test]
fn s1_direct_address_wakes_offline_managed_agent() {
    let mut world = world();
    world.register_managed("alice");
    world.register_human("bob");

    world.post(HOME_ROOM, "bob", "@alice can you help?");
    world.supervisor.poll_once().expect("poll");

    let agent = world.supervisor.project().store().get_agent("alice").expect("agent");
    assert_eq!(agent.presence, Presence::Spawning);
    assert!(agent.last_session_id.is_some(), "session_start not recorded");

    let launches = world.driver.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].agent_id, "alice");
    assert_eq!(launches[0].trigger_home, HOME_ROOM);
}

// S2: FYI mentions never wake, but the watermark advances
#[test]
fn s2_fyi_does_not_wake() {
    let mut world = world();
    world.register_managed("alice");
    world.register_human("bob");

    let message = world.post(HOME_ROOM, "bob", "FYI @alice deploy is done");
    world.supervisor.poll_once().expect("poll");

    let agent = world.supervisor.project().store().get_agent("alice").expect("agent");
    assert_eq!(agent.presence, Presence::Offline);
    assert_eq!(agent.mention_watermark.as_deref(), Some(message.id.as_str()));
    assert_eq!(world.driver.launch_count(), 0);
}

// S3: a plain reply wakes the parent author via reply_chain
#[test]
fn s3_reply_wakes_author() {
    let mut world = world();
    world.register_managed("alice");
    world.register_human("bob");

    let parent = world.post(HOME_ROOM, "alice", "shipping the fix");
    world.supervisor.poll_once().expect("poll");
    assert_eq!(world.driver.launch_count(), 0);

    world.clock.advance(Duration::from_secs(1));
    let ts = world.clock.unix_ts();
    let mut reply = NewMessage::in_home(HOME_ROOM, AgentId::new("bob"), "looks good");
    reply.reply_to = Some(parent.id.0.clone());
    let id_gen = world.id_gen.clone();
    world
        .project()
        .post_message(reply, &id_gen, ts)
        .expect("reply");
    world.supervisor.poll_once().expect("poll");

    assert_eq!(world.driver.launch_count(), 1);
    assert!(world.driver.launches()[0].prompt.contains("reply_chain"));
}

// S4 runs at the CLI layer (ambiguity rejects the post before any row
// exists); the daemon-side guarantee is that inert classes never spawn.
#[test]
fn inert_classes_never_spawn() {
    let mut world = world();
    world.register_managed("alice");
    world.register_human("bob");

    world.post(HOME_ROOM, "alice", "@alice note to self");
    world.post(HOME_ROOM, "bob", "cc @alice in passing");
    world.supervisor.poll_once().expect("poll");

    assert_eq!(world.driver.launch_count(), 0);
}

// Invariant 5: waking classes spawn exactly once per matching agent
#[test]
fn direct_address_spawns_exactly_once_across_polls() {
    let mut world = world();
    world.register_managed("alice");
    world.register_human("bob");

    world.post(HOME_ROOM, "bob", "@alice ping");
    world.supervisor.poll_once().expect("poll");
    world.supervisor.poll_once().expect("poll");
    world.supervisor.poll_once().expect("poll");

    assert_eq!(world.driver.launch_count(), 1);
}

// Invariant 8: debounced mentions drain FIFO with duplicates collapsed
#[test]
fn debouncer_drains_fifo_on_relaunch() {
    let mut world = world();
    world.register_managed("alice");
    world.register_human("bob");

    world.post(HOME_ROOM, "bob", "@alice one");
    world.supervisor.poll_once().expect("poll");
    let first = world.driver.last_session().expect("session");

    world.post(HOME_ROOM, "bob", "@alice two");
    world.post(HOME_ROOM, "bob", "@alice three");
    world.supervisor.poll_once().expect("poll");
    assert_eq!(world.driver.launch_count(), 1);

    world.driver.complete(&first, 0);
    world.supervisor.poll_once().expect("poll");

    assert_eq!(world.driver.launch_count(), 2);
    let prompt = &world.driver.launches()[1].prompt;
    let two = prompt.find("@alice two").expect("second mention in prompt");
    let three = prompt.find("@alice three").expect("third mention in prompt");
    assert!(two < three, "relaunch context out of order");
}
