// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fray_adapters::{FakeDriverAdapter, FakeRouterAdapter};
use fray_core::{
    AgentRecord, FakeClock, IdGen, IdKind, InvokeConfig, PersistMode, SequentialIdGen, ThreadKind,
    ThreadPatch, WakeCondition, WakeId,
};
use fray_storage::{init_project, NewMessage, Project, ThreadRef};
use std::time::Duration;

type TestSupervisor = Supervisor<FakeDriverAdapter, FakeRouterAdapter, FakeClock>;

struct Harness {
    supervisor: TestSupervisor,
    driver: FakeDriverAdapter,
    clock: FakeClock,
    id_gen: SequentialIdGen,
    _tmp: tempfile::TempDir,
}

fn harness_with_router(router: FakeRouterAdapter) -> Harness {
    let tmp = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);
    let id_gen = SequentialIdGen::new();
    init_project(tmp.path(), "m1", "test", &id_gen, clock.unix_ts()).unwrap();
    let project = Project::discover(tmp.path(), clock.unix_ts()).unwrap();

    let driver = FakeDriverAdapter::new();
    let supervisor = Supervisor::new(
        project,
        driver.clone(),
        router,
        clock.clone(),
        Timeouts::default(),
    )
    .unwrap();

    Harness {
        supervisor,
        driver,
        clock,
        id_gen,
        _tmp: tmp,
    }
}

fn harness() -> Harness {
    harness_with_router(FakeRouterAdapter::new())
}

impl Harness {
    fn register_managed(&mut self, id: &str) {
        let mut agent = AgentRecord::new(
            self.id_gen.next(IdKind::User),
            fray_core::AgentId::new(id),
            self.clock.unix_ts(),
        );
        agent.managed = true;
        agent.invoke = Some(InvokeConfig::new("claude"));
        self.supervisor
            .project
            .register_agent(agent, self.clock.unix_ts())
            .unwrap();
    }

    fn register_human(&mut self, id: &str) {
        let agent = AgentRecord::new(
            self.id_gen.next(IdKind::User),
            fray_core::AgentId::new(id),
            self.clock.unix_ts(),
        );
        self.supervisor
            .project
            .register_agent(agent, self.clock.unix_ts())
            .unwrap();
    }

    fn post(&mut self, home: &str, from: &str, body: &str) -> fray_core::Message {
        // Advance so posts land strictly after the previous activity
        self.clock.advance(Duration::from_secs(1));
        let draft = NewMessage::in_home(home, fray_core::AgentId::new(from), body);
        self.supervisor
            .project
            .post_message(draft, &self.id_gen, self.clock.unix_ts())
            .unwrap()
    }

    fn reply(&mut self, parent: &fray_core::Message, from: &str, body: &str) -> fray_core::Message {
        self.clock.advance(Duration::from_secs(1));
        let mut draft = NewMessage::in_home(&parent.home, fray_core::AgentId::new(from), body);
        draft.reply_to = Some(parent.id.0.clone());
        self.supervisor
            .project
            .post_message(draft, &self.id_gen, self.clock.unix_ts())
            .unwrap()
    }

    fn presence(&self, agent: &str) -> fray_core::Presence {
        self.supervisor
            .project
            .store()
            .get_agent(agent)
            .unwrap()
            .presence
    }

    fn watermark(&self, agent: &str) -> Option<String> {
        self.supervisor
            .project
            .store()
            .get_agent(agent)
            .unwrap()
            .mention_watermark
    }
}

#[test]
fn direct_address_wakes_offline_managed_agent() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_human("bob");

    h.post("room", "bob", "@alice can you help?");
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.presence("alice"), fray_core::Presence::Spawning);
    assert_eq!(h.driver.launch_count(), 1);
    let launch = &h.driver.launches()[0];
    assert_eq!(launch.agent_id, "alice");
    assert_eq!(launch.trigger_home, "room");
    assert!(launch.prompt.contains("@alice can you help?"));

    // session_start recorded the session against the agent
    let agent = h.supervisor.project.store().get_agent("alice").unwrap();
    assert!(agent.last_session_id.is_some());
}

#[test]
fn fyi_does_not_wake_but_advances_watermark() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_human("bob");

    let message = h.post("room", "bob", "FYI @alice deploy is done");
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.presence("alice"), fray_core::Presence::Offline);
    assert_eq!(h.driver.launch_count(), 0);
    assert_eq!(h.watermark("alice").unwrap(), message.id.as_str());
}

#[test]
fn reply_wakes_parent_author() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_human("bob");

    let parent = h.post("room", "alice", "shipping the fix now");
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.driver.launch_count(), 0);

    h.reply(&parent, "bob", "looks good");
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.presence("alice"), fray_core::Presence::Spawning);
    assert_eq!(h.driver.launch_count(), 1);
    assert!(h.driver.launches()[0].prompt.contains("reply_chain"));
}

#[test]
fn self_mention_never_spawns() {
    let mut h = harness();
    h.register_managed("alice");

    h.post("room", "alice", "@alice remember to check the queue");
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.driver.launch_count(), 0);
}

#[test]
fn busy_agent_mentions_debounce_and_relaunch_in_order() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_human("bob");

    h.post("room", "bob", "@alice first");
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.driver.launch_count(), 1);
    let first_session = h.driver.last_session().unwrap();

    // Two more mentions while spawning/active, plus a duplicate scan
    let second = h.post("room", "bob", "@alice second");
    let third = h.post("room", "bob", "@alice third");
    h.supervisor.poll_once().unwrap();
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.driver.launch_count(), 1);
    assert_eq!(h.supervisor.debouncer.pending("alice"), 2);

    // Clean exit drains the queue into one relaunch, FIFO
    h.driver.complete(&first_session, 0);
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.driver.launch_count(), 2);
    let launches = h.driver.launches();
    let relaunch = &launches[1];
    let second_pos = relaunch.prompt.find(second.body.as_str()).unwrap();
    let third_pos = relaunch.prompt.find(third.body.as_str()).unwrap();
    assert!(second_pos < third_pos);
    assert!(!h.supervisor.debouncer.has_pending("alice"));
}

#[test]
fn clean_exit_without_pending_goes_idle() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_human("bob");

    h.post("room", "bob", "@alice ping");
    h.supervisor.poll_once().unwrap();
    let session = h.driver.last_session().unwrap();

    h.driver.complete(&session, 0);
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.presence("alice"), fray_core::Presence::Idle);
    assert!(h.supervisor.sessions.is_empty());

    // Idle agents relaunch on the next mention
    h.post("room", "bob", "@alice again");
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.driver.launch_count(), 2);
}

#[test]
fn spawn_timeout_marks_error() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_human("bob");

    h.post("room", "bob", "@alice ping");
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.presence("alice"), fray_core::Presence::Spawning);

    h.clock.advance(Duration::from_millis(30_001));
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.presence("alice"), fray_core::Presence::Error);
}

#[test]
fn heartbeat_promotes_spawning_to_active() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_human("bob");

    h.post("room", "bob", "@alice ping");
    h.supervisor.poll_once().unwrap();

    h.clock.advance(Duration::from_secs(2));
    h.supervisor
        .project
        .heartbeat(
            &fray_core::AgentId::new("alice"),
            h.clock.epoch_ms(),
            h.clock.unix_ts(),
        )
        .unwrap();
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.presence("alice"), fray_core::Presence::Active);
}

#[test]
fn done_detection_recycles_to_idle() {
    let mut h = harness();
    // min_checkin of 60s
    let mut agent = AgentRecord::new(
        h.id_gen.next(IdKind::User),
        fray_core::AgentId::new("alice"),
        h.clock.unix_ts(),
    );
    agent.managed = true;
    let mut invoke = InvokeConfig::new("claude");
    invoke.min_checkin_ms = 60_000;
    agent.invoke = Some(invoke);
    h.supervisor
        .project
        .register_agent(agent, h.clock.unix_ts())
        .unwrap();
    h.register_human("bob");

    h.post("room", "bob", "@alice ping");
    h.supervisor.poll_once().unwrap();
    let session = h.driver.last_session().unwrap();

    // Heartbeat brings it active, then silence past the checkin bound
    h.clock.advance(Duration::from_secs(2));
    h.supervisor
        .project
        .heartbeat(
            &fray_core::AgentId::new("alice"),
            h.clock.epoch_ms(),
            h.clock.unix_ts(),
        )
        .unwrap();
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.presence("alice"), fray_core::Presence::Active);

    h.clock.advance(Duration::from_millis(60_001));
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.presence("alice"), fray_core::Presence::Idle);
    assert!(h.driver.was_stop_signalled(&session));
}

#[test]
fn fast_failed_resume_clears_session_and_stays_idle() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_human("bob");

    // A prior session to resume
    h.supervisor
        .project
        .update_agent(
            &fray_core::AgentId::new("alice"),
            fray_core::AgentPatch {
                last_session_id: Some(fray_core::SessionId::new("stale-session")),
                ..fray_core::AgentPatch::default()
            },
            h.clock.unix_ts(),
        )
        .unwrap();

    h.post("room", "bob", "@alice ping");
    h.supervisor.poll_once().unwrap();
    let launch = &h.driver.launches()[0];
    assert_eq!(launch.resume_session.as_deref(), Some("stale-session"));

    // Driver refuses the resume within the 30s window
    let session = h.driver.last_session().unwrap();
    h.clock.advance(Duration::from_secs(3));
    h.driver.complete(&session, 1);
    h.supervisor.poll_once().unwrap();

    let agent = h.supervisor.project.store().get_agent("alice").unwrap();
    assert_eq!(agent.presence, fray_core::Presence::Idle);
    assert!(agent.last_session_id.is_none());
    // No automatic retry
    assert_eq!(h.driver.launch_count(), 1);
}

#[test]
fn late_crash_marks_error() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_human("bob");

    h.post("room", "bob", "@alice ping");
    h.supervisor.poll_once().unwrap();
    let session = h.driver.last_session().unwrap();

    h.clock.advance(Duration::from_secs(120));
    h.driver.complete(&session, 2);
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.presence("alice"), fray_core::Presence::Error);
}

#[test]
fn broadcast_spawns_each_available_managed_agent_once() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_managed("carol");
    h.register_managed("dave");
    h.register_human("bob");

    // dave is away
    h.supervisor
        .project
        .agent_bye(&fray_core::AgentId::new("dave"), h.clock.unix_ts())
        .unwrap();

    h.post("room", "bob", "@all standup");
    h.supervisor.poll_once().unwrap();

    let mut spawned: Vec<String> = h
        .driver
        .launches()
        .iter()
        .map(|l| l.agent_id.clone())
        .collect();
    spawned.sort();
    assert_eq!(spawned, vec!["alice", "carol"]);
}

#[test]
fn ownership_gate_blocks_agent_mentions_in_owned_thread() {
    let mut h = harness();
    h.register_managed("alice");
    h.register_managed("coordinator");
    h.register_human("bob");

    let ts = h.clock.unix_ts();
    let thread = h
        .supervisor
        .project
        .create_thread(
            "work/owned",
            None,
            ThreadKind::Standard,
            &fray_core::AgentId::new("bob"),
            &h.id_gen,
            ts,
        )
        .unwrap();
    h.supervisor
        .project
        .update_thread(
            &ThreadRef(thread.guid.0.clone()),
            ThreadPatch {
                owner_agent: Some(fray_core::AgentId::new("coordinator")),
                ..ThreadPatch::default()
            },
            ts,
        )
        .unwrap();
    h.supervisor.poll_once().unwrap();

    // A non-owner managed agent mentions alice: informational only
    h.post(thread.guid.as_str(), "carol-agent", "@alice take a look");
    h.register_managed("carol-agent");
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.driver.launch_count(), 0);

    // A human posting the same thing spawns
    h.post(thread.guid.as_str(), "bob", "@alice take a look");
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.driver.launch_count(), 1);
}

#[test]
fn after_timer_fires_and_clears() {
    let mut h = harness();
    h.register_managed("alice");

    let ts = h.clock.unix_ts();
    let condition = WakeCondition {
        guid: WakeId::new("wake-000000000001"),
        agent_id: fray_core::AgentId::new("alice"),
        set_by: fray_core::AgentId::new("alice"),
        wake_type: fray_core::WakeType::After,
        pattern: None,
        on_agents: Vec::new(),
        in_thread: None,
        after_ms: 120_000,
        use_router: false,
        prompt_text: None,
        poll_interval_ms: 0,
        last_polled_at: 0,
        persist_mode: PersistMode::None,
        paused: false,
        created_at: ts,
        expires_at: Some(ts + 120),
    };
    h.supervisor
        .project
        .set_wake_condition(condition, ts)
        .unwrap();

    h.supervisor.poll_once().unwrap();
    assert_eq!(h.driver.launch_count(), 0);

    h.clock.advance(Duration::from_secs(121));
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.driver.launch_count(), 1);
    // One-shot condition cleared after firing
    assert!(h
        .supervisor
        .project
        .store()
        .list_wake_conditions(Some("alice"))
        .unwrap()
        .is_empty());
}

#[test]
fn pattern_condition_with_router_decline_does_not_spawn() {
    let mut h =
        harness_with_router(FakeRouterAdapter::new().respond(false, 0.9).fail("router down"));
    h.register_managed("alice");
    h.register_human("bob");

    let ts = h.clock.unix_ts();
    let condition = WakeCondition {
        guid: WakeId::new("wake-000000000001"),
        agent_id: fray_core::AgentId::new("alice"),
        set_by: fray_core::AgentId::new("alice"),
        wake_type: fray_core::WakeType::Pattern,
        pattern: Some("deploy".to_string()),
        on_agents: Vec::new(),
        in_thread: None,
        after_ms: 0,
        use_router: true,
        prompt_text: Some("about alice's service?".to_string()),
        poll_interval_ms: 0,
        last_polled_at: 0,
        persist_mode: PersistMode::Persist,
        paused: false,
        created_at: ts,
        expires_at: None,
    };
    h.supervisor
        .project
        .set_wake_condition(condition, ts)
        .unwrap();

    h.post("room", "bob", "deploy finished");
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.driver.launch_count(), 0);

    // Router failure degrades to spawn on the next match
    h.post("room", "bob", "deploy again");
    h.supervisor.poll_once().unwrap();
    assert_eq!(h.driver.launch_count(), 1);
}

#[test]
fn restart_reconciles_stale_busy_presence() {
    let mut h = harness();
    h.register_managed("alice");
    h.supervisor
        .project
        .set_presence(
            &fray_core::AgentId::new("alice"),
            fray_core::Presence::Active,
            h.clock.unix_ts(),
        )
        .unwrap();

    // A fresh supervisor over the same project finds no live session
    let root = h._tmp.path().to_path_buf();
    drop(h.supervisor);
    let project = Project::discover(&root, h.clock.unix_ts()).unwrap();
    let supervisor: TestSupervisor = Supervisor::new(
        project,
        FakeDriverAdapter::new(),
        FakeRouterAdapter::new(),
        h.clock.clone(),
        Timeouts::default(),
    )
    .unwrap();

    assert_eq!(
        supervisor.project.store().get_agent("alice").unwrap().presence,
        fray_core::Presence::Offline
    );
}

#[test]
fn unmanaged_agents_left_for_human_pickup() {
    let mut h = harness();
    h.register_human("alice");
    h.register_human("bob");

    h.post("room", "bob", "@alice please review");
    h.supervisor.poll_once().unwrap();

    assert_eq!(h.driver.launch_count(), 0);
    assert_eq!(h.presence("alice"), fray_core::Presence::Offline);
}
