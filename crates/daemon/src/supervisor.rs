// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cooperative scheduler.
//!
//! One decision at a time: the run loop merges the file watcher and a
//! one-second tick into calls to [`Supervisor::poll_once`], which scans
//! new messages, evaluates wake conditions, applies spawn decisions,
//! and sweeps live sessions for exits and timeouts. All presence and
//! state mutations happen here.

use crate::session::{ActiveSession, SessionTable};
use fray_adapters::router::RouterAdapter;
use fray_adapters::{DriverAdapter, DriverError, LaunchSpec};
use fray_core::{
    AgentId, AgentPatch, AgentRecord, Clock, Message, Presence, SessionId, WakeType, HOME_ROOM,
};
use fray_engine::{
    classify, compile_conditions, decide, due_polls, due_timers, evaluate_message, post_trigger,
    render_wake_prompt, router_gate, Classification, ClassifyContext, Debouncer, DecisionContext,
    MentionClass, PendingMention, PostTrigger, SpawnDecision, WakeHit, WakePromptInput,
    WakeReason, DEFAULT_WAKE_TEMPLATE,
};
use fray_storage::store::MessageCursor;
use fray_storage::{Project, StorageError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Window after launch in which a nonzero exit of a resumed session is
/// treated as a failed resume rather than a crash.
const RESUME_FAILURE_WINDOW_MS: u64 = 30_000;

/// How many new messages one poll round processes at most.
const SCAN_BATCH: usize = 256;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Process-wide defaults; a per-agent invoke config overrides the spawn
/// bound when nonzero.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Bounds spawning→active (`T_spawn`).
    pub spawn_timeout_ms: u64,
    /// Grace between stop signal and hard kill (`T_kill`).
    pub kill_grace_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            spawn_timeout_ms: 30_000,
            kill_grace_ms: 5_000,
        }
    }
}

pub struct Supervisor<D: DriverAdapter, R: RouterAdapter, C: Clock> {
    project: Project,
    driver: D,
    router: R,
    clock: C,
    timeouts: Timeouts,
    debouncer: Debouncer,
    sessions: SessionTable,
    cursor: Option<MessageCursor>,
    wake_template: String,
}

impl<D: DriverAdapter, R: RouterAdapter, C: Clock> Supervisor<D, R, C> {
    /// Build a supervisor over an open project. History present at
    /// startup is not replayed; the cursor starts at the newest message.
    pub fn new(
        mut project: Project,
        driver: D,
        router: R,
        clock: C,
        timeouts: Timeouts,
    ) -> Result<Self, SupervisorError> {
        // Reconcile stale presence: no session survives a supervisor
        // restart, so busy agents are really offline and resumable
        let ts = clock.unix_ts();
        for agent in project.store().list_agents()? {
            if agent.presence.is_busy() {
                info!(agent = %agent.agent_id, was = %agent.presence, "reconciling stale presence");
                project.set_presence(&agent.agent_id, Presence::Offline, ts)?;
            }
        }

        let cursor = project
            .store()
            .list_all_messages()?
            .last()
            .map(MessageCursor::of);
        let wake_template = load_wake_template(&project);
        Ok(Self {
            project,
            driver,
            router,
            clock,
            timeouts,
            debouncer: Debouncer::new(),
            sessions: SessionTable::new(),
            cursor,
            wake_template,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Mutable project access for callers hosting the supervisor (hook
    /// writes, tests).
    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// One cooperative round: refresh the cache, route new posts, sweep
    /// sessions and time-based conditions. Errors on individual records
    /// are logged, never fatal to the daemon.
    pub fn poll_once(&mut self) -> Result<(), SupervisorError> {
        let ts = self.clock.unix_ts();
        if self.project.refresh_if_stale(ts)? {
            debug!("cache refreshed from changed logs");
        }
        self.process_new_messages()?;
        self.sweep_sessions()?;
        self.evaluate_timers_and_polls()?;
        Ok(())
    }

    fn process_new_messages(&mut self) -> Result<(), SupervisorError> {
        loop {
            let batch = self
                .project
                .store()
                .messages_after(self.cursor.as_ref(), SCAN_BATCH)?;
            if batch.is_empty() {
                return Ok(());
            }
            for message in &batch {
                if let Err(e) = self.handle_message(message) {
                    warn!(message = %message.id, error = %e, "routing failed for message");
                }
                self.cursor = Some(MessageCursor::of(message));
            }
        }
    }

    /// Route one new post: classification, spawn decisions, watermarks,
    /// and message-armed wake conditions.
    fn handle_message(&mut self, message: &Message) -> Result<(), SupervisorError> {
        let agents = self.project.store().list_agents()?;
        let authors = self.project.store().reply_chain_authors(message, 5)?;
        let machine = self.project.machine_id().as_str().to_string();

        let classification = classify(
            &message.body,
            &ClassifyContext {
                from_agent: message.from_agent.as_str(),
                reply_chain_authors: &authors,
                agents: &agents,
                machine: &machine,
            },
        );

        let thread = if message.home == HOME_ROOM {
            None
        } else {
            self.project.store().try_get_thread(&message.home)?
        };
        let thread_owner = thread
            .as_ref()
            .and_then(|t| t.owner_agent.as_ref())
            .map(|o| o.as_str().to_string());
        let poster_is_human = agents
            .iter()
            .find(|a| a.agent_id == message.from_agent)
            .is_none_or(|a| !a.managed);

        if classification.is_ambiguous() {
            // The CLI rejects ambiguous posts before they land; one that
            // arrived from another machine is logged and skipped
            warn!(message = %message.id, "ambiguous mention in synced message, not routing");
        }

        self.route_recipients(
            message,
            &classification,
            &agents,
            thread_owner.as_deref(),
            poster_is_human,
        )?;

        // Message-armed wake conditions (on_mention, pattern)
        let conditions = self.project.store().active_wake_conditions()?;
        let compiled = compile_conditions(&conditions);
        let hits = evaluate_message(&compiled, message, thread.as_ref());
        for hit in hits {
            self.fire_condition(hit, Some(message))?;
        }
        Ok(())
    }

    fn route_recipients(
        &mut self,
        message: &Message,
        classification: &Classification,
        agents: &[AgentRecord],
        thread_owner: Option<&str>,
        poster_is_human: bool,
    ) -> Result<(), SupervisorError> {
        let ts = self.clock.unix_ts();

        for (recipient, class) in &classification.recipients {
            if recipient == "all" {
                if *class == MentionClass::Broadcast {
                    self.fan_out_broadcast(message, agents, thread_owner, poster_is_human)?;
                }
                continue;
            }

            let Some(agent) = agents
                .iter()
                .find(|a| a.agent_id.as_str() == recipient.as_str())
            else {
                continue;
            };

            self.apply_decision(
                message,
                agent,
                *class,
                classification.fork_sessions.get(recipient).cloned(),
                thread_owner,
                poster_is_human,
            )?;

            // The watermark advances for every considered recipient,
            // spawned or not
            let agent_id = agent.agent_id.clone();
            self.project.update_agent(
                &agent_id,
                AgentPatch {
                    mention_watermark: Some(message.id.0.clone()),
                    ..AgentPatch::default()
                },
                ts,
            )?;
        }
        Ok(())
    }

    /// `@all` expands at wake time to managed agents currently able to
    /// take a session; busy agents pick the message up from their
    /// debouncer on next idle.
    fn fan_out_broadcast(
        &mut self,
        message: &Message,
        agents: &[AgentRecord],
        thread_owner: Option<&str>,
        poster_is_human: bool,
    ) -> Result<(), SupervisorError> {
        for agent in agents {
            if !agent.managed || agent.agent_id == message.from_agent {
                continue;
            }
            self.apply_decision(
                message,
                agent,
                MentionClass::Broadcast,
                None,
                thread_owner,
                poster_is_human,
            )?;
        }
        Ok(())
    }

    fn apply_decision(
        &mut self,
        message: &Message,
        agent: &AgentRecord,
        class: MentionClass,
        fork_session: Option<String>,
        thread_owner: Option<&str>,
        poster_is_human: bool,
    ) -> Result<(), SupervisorError> {
        let decision = decide(&DecisionContext {
            agent,
            class,
            poster: message.from_agent.as_str(),
            poster_is_human,
            thread_owner,
        });

        match decision {
            SpawnDecision::Launch => {
                let messages = vec![message.clone()];
                self.launch(
                    agent,
                    &message.home,
                    &messages,
                    &format!("{} from @{}", class, message.from_agent),
                    fork_session.as_deref(),
                )?;
            }
            SpawnDecision::Enqueue => {
                let queued = self.debouncer.push(
                    agent.agent_id.as_str(),
                    PendingMention {
                        message_id: message.id.0.clone(),
                        home: message.home.clone(),
                        from_agent: message.from_agent.to_string(),
                    },
                );
                if queued {
                    debug!(agent = %agent.agent_id, message = %message.id, "mention debounced");
                }
            }
            SpawnDecision::Skip(reason) => {
                debug!(agent = %agent.agent_id, ?reason, class = %class, "no spawn");
            }
        }
        Ok(())
    }

    /// Launch a driver session for an agent.
    fn launch(
        &mut self,
        agent: &AgentRecord,
        home: &str,
        trigger: &[Message],
        reason: &str,
        fork_session: Option<&str>,
    ) -> Result<(), SupervisorError> {
        let Some(invoke) = &agent.invoke else {
            warn!(agent = %agent.agent_id, "managed agent without invoke config, cannot spawn");
            return Ok(());
        };
        if self.sessions.contains(agent.agent_id.as_str()) {
            // A live child means presence lagged; treat as busy
            for message in trigger {
                self.debouncer.push(
                    agent.agent_id.as_str(),
                    PendingMention {
                        message_id: message.id.0.clone(),
                        home: message.home.clone(),
                        from_agent: message.from_agent.to_string(),
                    },
                );
            }
            return Ok(());
        }

        let now_ms = self.clock.epoch_ms();
        let ts = self.clock.unix_ts();

        let prompt = render_wake_prompt(
            &self.wake_template,
            &WakePromptInput {
                agent_id: agent.agent_id.as_str(),
                channel: &self.project.config().channel_name,
                home,
                wake_reason: reason,
                messages: trigger,
                fork_session,
                fork_session_pruned: false,
            },
        );

        // Fork syntax spawns fresh with a visibility pointer; otherwise a
        // prior session resumes
        let resume = if fork_session.is_none() {
            agent.last_session_id.as_ref().map(|s| s.0.clone())
        } else {
            None
        };

        let mut spec = LaunchSpec::new(agent.agent_id.as_str(), &invoke.driver);
        spec.args = invoke.args.clone();
        spec.prompt = prompt;
        spec.prompt_delivery = invoke.prompt_delivery;
        spec.trigger_home = home.to_string();
        spec.job = agent
            .job_id
            .as_ref()
            .map(|job| (job.0.clone(), agent.job_idx.unwrap_or(0)));
        spec.resume_session = resume.clone();

        match self.driver.launch(&spec) {
            Ok(handle) => {
                info!(
                    agent = %agent.agent_id,
                    session = %handle.session_id.short(8),
                    reason,
                    "session launched"
                );
                self.project
                    .set_presence(&agent.agent_id, Presence::Spawning, ts)?;
                self.project.session_start(
                    &agent.agent_id,
                    &handle.session_id,
                    Some(home.to_string()),
                    ts,
                )?;
                let spawn_timeout = if invoke.spawn_timeout_ms > 0 {
                    invoke.spawn_timeout_ms
                } else {
                    self.timeouts.spawn_timeout_ms
                };
                self.sessions.insert(ActiveSession {
                    agent_id: agent.agent_id.as_str().to_string(),
                    handle,
                    launched_at_ms: now_ms,
                    spawn_deadline_ms: now_ms + spawn_timeout,
                    min_checkin_ms: invoke.min_checkin_ms,
                    max_runtime_ms: invoke.max_runtime_ms,
                    resumed: resume.is_some(),
                    stop_requested_at_ms: None,
                });
            }
            Err(e) => {
                warn!(agent = %agent.agent_id, error = %e, "driver launch failed");
                self.project
                    .set_presence(&agent.agent_id, Presence::Error, ts)?;
            }
        }
        Ok(())
    }

    /// Sweep live sessions: exits, spawn timeouts, done-detection,
    /// runtime caps, kill escalation.
    fn sweep_sessions(&mut self) -> Result<(), SupervisorError> {
        let now_ms = self.clock.epoch_ms();
        let ts = self.clock.unix_ts();

        for agent_id in self.sessions.agent_ids() {
            let Some(session) = self.sessions.get(&agent_id).cloned() else {
                continue;
            };

            match self.driver.try_wait(&session.handle) {
                Ok(Some(exit_code)) => {
                    self.on_session_exit(&session, exit_code)?;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(agent = %agent_id, error = %e, "session lost, dropping");
                    self.sessions.remove(&agent_id);
                    continue;
                }
            }

            let Some(agent) = self.project.store().try_get_agent(&agent_id)? else {
                continue;
            };

            // Kill escalation: grace expired after a stop signal
            if let Some(requested) = session.stop_requested_at_ms {
                if now_ms.saturating_sub(requested) >= self.timeouts.kill_grace_ms {
                    warn!(agent = %agent_id, "stop grace expired, killing");
                    let _ = self.driver.kill(&session.handle);
                }
                continue;
            }

            // Hard runtime cap
            if session.max_runtime_ms > 0
                && now_ms.saturating_sub(session.launched_at_ms) >= session.max_runtime_ms
            {
                info!(agent = %agent_id, "max runtime reached, stopping session");
                self.request_stop(&agent_id)?;
                continue;
            }

            match agent.presence {
                Presence::Spawning => {
                    // First sign of life promotes to active: a heartbeat
                    // since launch, or a post strictly after it
                    let alive = (agent.last_heartbeat > 0
                        && agent.last_heartbeat >= session.launched_at_ms)
                        || (agent.last_seen as u64 * 1000) > session.launched_at_ms;
                    if alive {
                        self.project
                            .set_presence(&agent.agent_id, Presence::Active, ts)?;
                    } else if now_ms >= session.spawn_deadline_ms {
                        warn!(agent = %agent_id, "spawn timeout, marking error");
                        self.project
                            .set_presence(&agent.agent_id, Presence::Error, ts)?;
                        self.request_stop(&agent_id)?;
                    }
                }
                Presence::Active | Presence::Prompting | Presence::Prompted => {
                    if session.min_checkin_ms > 0 {
                        let last_activity = agent
                            .last_heartbeat
                            .max(agent.last_seen as u64 * 1000)
                            .max(session.launched_at_ms);
                        if now_ms.saturating_sub(last_activity) > session.min_checkin_ms {
                            info!(agent = %agent_id, "done-detection fired, recycling");
                            self.project
                                .set_presence(&agent.agent_id, Presence::Idle, ts)?;
                            self.request_stop(&agent_id)?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn request_stop(&mut self, agent_id: &str) -> Result<(), SupervisorError> {
        let now_ms = self.clock.epoch_ms();
        if let Some(session) = self.sessions.get_mut(agent_id) {
            if session.stop_requested_at_ms.is_none() {
                session.stop_requested_at_ms = Some(now_ms);
                let handle = session.handle.clone();
                if let Err(e) = self.driver.signal_stop(&handle) {
                    warn!(agent = %agent_id, error = %e, "stop signal failed");
                }
            }
        }
        Ok(())
    }

    fn on_session_exit(
        &mut self,
        session: &ActiveSession,
        exit_code: i32,
    ) -> Result<(), SupervisorError> {
        let now_ms = self.clock.epoch_ms();
        let ts = self.clock.unix_ts();
        self.sessions.remove(&session.agent_id);

        let agent_id = AgentId::new(session.agent_id.clone());
        self.project.session_end(
            &agent_id,
            &session.handle.session_id,
            Some(exit_code),
            ts,
        )?;
        self.project.update_agent(
            &agent_id,
            AgentPatch {
                last_session_id: Some(SessionId::new(session.handle.session_id.0.clone())),
                ..AgentPatch::default()
            },
            ts,
        )?;

        if exit_code == 0 {
            self.project.set_presence(&agent_id, Presence::Idle, ts)?;
            info!(agent = %agent_id, "session ended cleanly");
            self.relaunch_if_pending(&agent_id)?;
        } else if session.resumed
            && now_ms.saturating_sub(session.launched_at_ms) < RESUME_FAILURE_WINDOW_MS
        {
            // Likely a failed session resume: forget the session, stay
            // resumable, no automatic retry
            warn!(agent = %agent_id, exit_code, "fast failure on resume, clearing session");
            self.project.update_agent(
                &agent_id,
                AgentPatch {
                    clear_session: true,
                    ..AgentPatch::default()
                },
                ts,
            )?;
            self.project.set_presence(&agent_id, Presence::Idle, ts)?;
        } else {
            warn!(agent = %agent_id, exit_code, "session crashed");
            self.project.set_presence(&agent_id, Presence::Error, ts)?;
        }
        Ok(())
    }

    /// On clean exit with pending mentions, relaunch immediately with
    /// the accumulated context.
    fn relaunch_if_pending(&mut self, agent_id: &AgentId) -> Result<(), SupervisorError> {
        if !self.debouncer.has_pending(agent_id.as_str()) {
            return Ok(());
        }
        let pending = self.debouncer.drain(agent_id.as_str());
        let Some(agent) = self.project.store().try_get_agent(agent_id.as_str())? else {
            return Ok(());
        };

        let mut messages = Vec::new();
        for mention in &pending {
            if let Some(message) = self.project.store().try_get_message(&mention.message_id)? {
                messages.push(message);
            }
        }
        let home = pending
            .first()
            .map(|m| m.home.clone())
            .unwrap_or_else(|| HOME_ROOM.to_string());

        info!(agent = %agent_id, count = pending.len(), "relaunching with debounced mentions");
        self.launch(&agent, &home, &messages, "debounced mentions", None)?;
        Ok(())
    }

    /// Timer- and poll-armed conditions.
    fn evaluate_timers_and_polls(&mut self) -> Result<(), SupervisorError> {
        let ts = self.clock.unix_ts();
        let conditions = self.project.store().active_wake_conditions()?;

        for hit in due_timers(&conditions, ts) {
            self.fire_condition(hit, None)?;
        }

        for hit in due_polls(&conditions, ts) {
            let condition = hit.condition.clone();
            // Mark polled first so a failing router still respects the
            // interval
            self.project.reset_wake_condition(&condition.guid, ts)?;

            let context = self
                .project
                .store()
                .list_all_messages()?
                .last()
                .map(|m| m.body.clone())
                .unwrap_or_default();
            let prompt = condition.prompt_text.clone().unwrap_or_default();
            let outcome = router_gate(&self.router, &condition, &context);
            if prompt.is_empty() || outcome.proceed {
                self.fire_condition(hit, None)?;
            }
        }
        Ok(())
    }

    /// A satisfied condition nominates its agent for spawn.
    fn fire_condition(
        &mut self,
        hit: WakeHit,
        message: Option<&Message>,
    ) -> Result<(), SupervisorError> {
        let ts = self.clock.unix_ts();
        let condition = &hit.condition;

        // Two-stage pattern filter: regex gated, router decides
        if let WakeReason::PatternMatch { needs_router: true } = hit.reason {
            let body = message.map(|m| m.body.as_str()).unwrap_or_default();
            let outcome = router_gate(&self.router, condition, body);
            if !outcome.proceed {
                debug!(condition = %condition.guid, "router declined wake");
                return Ok(());
            }
        }

        let Some(agent) = self
            .project
            .store()
            .try_get_agent(condition.agent_id.as_str())?
        else {
            return Ok(());
        };
        if !agent.managed || agent.is_away() {
            return Ok(());
        }

        if agent.presence.is_busy() {
            self.debouncer.push(
                agent.agent_id.as_str(),
                PendingMention {
                    message_id: message
                        .map(|m| m.id.0.clone())
                        .unwrap_or_else(|| condition.guid.0.clone()),
                    home: message
                        .map(|m| m.home.clone())
                        .unwrap_or_else(|| HOME_ROOM.to_string()),
                    from_agent: condition.set_by.to_string(),
                },
            );
        } else {
            let home = message
                .map(|m| m.home.clone())
                .or_else(|| condition.in_thread.as_ref().map(|t| t.0.clone()))
                .unwrap_or_else(|| HOME_ROOM.to_string());
            let trigger: Vec<Message> = message.cloned().into_iter().collect();
            let reason = format!("wake condition {} ({})", condition.guid, condition.wake_type);
            self.launch(&agent, &home, &trigger, &reason, None)?;
        }

        match post_trigger(condition) {
            PostTrigger::Clear => {
                self.project.clear_wake_condition(&condition.guid, ts)?;
            }
            PostTrigger::Keep => {
                if condition.wake_type == WakeType::After {
                    self.project.reset_wake_condition(&condition.guid, ts)?;
                }
            }
        }
        Ok(())
    }

    /// Graceful shutdown: stop every live session, wait out the grace
    /// period via subsequent sweeps if the caller keeps polling.
    pub fn shutdown(&mut self) -> Result<(), SupervisorError> {
        for agent_id in self.sessions.agent_ids() {
            self.request_stop(&agent_id)?;
        }
        Ok(())
    }

    /// Run until the wake channel closes: one poll per watcher signal or
    /// one-second tick, whichever comes first.
    pub async fn run(
        mut self,
        mut wake_rx: tokio::sync::mpsc::Receiver<()>,
    ) -> Result<(), SupervisorError> {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(1));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                signal = wake_rx.recv() => {
                    if signal.is_none() {
                        info!("wake channel closed, shutting down");
                        self.shutdown()?;
                        return Ok(());
                    }
                }
                _ = tick.tick() => {}
            }
            if let Err(e) = self.poll_once() {
                warn!(error = %e, "poll round failed");
            }
        }
    }
}

fn load_wake_template(project: &Project) -> String {
    let path = project.paths().prompts_dir().join("wake.md");
    match std::fs::read_to_string(&path) {
        Ok(template) => template,
        Err(_) => DEFAULT_WAKE_TEMPLATE.to_string(),
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
