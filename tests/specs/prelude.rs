// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared scenario fixtures.

use fray_adapters::{FakeDriverAdapter, FakeRouterAdapter};
use fray_core::{
    AgentId, AgentRecord, Clock, FakeClock, IdGen, IdKind, InvokeConfig, Message, SequentialIdGen,
};
use fray_daemon::{Supervisor, Timeouts};
use fray_storage::{init_project, NewMessage, Project};
use std::time::Duration;

pub type SpecSupervisor = Supervisor<FakeDriverAdapter, FakeRouterAdapter, FakeClock>;

pub struct World {
    pub supervisor: SpecSupervisor,
    pub driver: FakeDriverAdapter,
    pub clock: FakeClock,
    pub id_gen: SequentialIdGen,
    pub tmp: tempfile::TempDir,
}

/// Fresh single-machine project with a supervisor over fake adapters.
pub fn world() -> World {
    let tmp = tempfile::tempdir().expect("tempdir");
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);
    let id_gen = SequentialIdGen::new();
    init_project(tmp.path(), "m1", "spec", &id_gen, clock.unix_ts()).expect("init");
    let project = Project::discover(tmp.path(), clock.unix_ts()).expect("open");

    let driver = FakeDriverAdapter::new();
    let supervisor = Supervisor::new(
        project,
        driver.clone(),
        FakeRouterAdapter::new(),
        clock.clone(),
        Timeouts::default(),
    )
    .expect("supervisor");

    World {
        supervisor,
        driver,
        clock,
        id_gen,
        tmp,
    }
}

impl World {
    pub fn project(&mut self) -> &mut Project {
        self.supervisor.project_mut()
    }

    pub fn register_managed(&mut self, id: &str) {
        let ts = self.clock.unix_ts();
        let mut agent = AgentRecord::new(self.id_gen.next(IdKind::User), AgentId::new(id), ts);
        agent.managed = true;
        agent.invoke = Some(InvokeConfig::new("claude"));
        self.project().register_agent(agent, ts).expect("register");
    }

    pub fn register_human(&mut self, id: &str) {
        let ts = self.clock.unix_ts();
        let agent = AgentRecord::new(self.id_gen.next(IdKind::User), AgentId::new(id), ts);
        self.project().register_agent(agent, ts).expect("register");
    }

    pub fn post(&mut self, home: &str, from: &str, body: &str) -> Message {
        self.clock.advance(Duration::from_secs(1));
        let ts = self.clock.unix_ts();
        let draft = NewMessage::in_home(home, AgentId::new(from), body);
        let id_gen = self.id_gen.clone();
        self.project().post_message(draft, &id_gen, ts).expect("post")
    }
}
