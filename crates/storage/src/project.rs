// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project handle: bootstrap, write operations, event routing.
//!
//! [`Project`] owns the per-machine log, the runtime log, the machine
//! identity, and the SQLite cache. Every write op validates against the
//! cache, durably appends to the right JSONL file, then folds the event
//! into the cache, in that order, so the log never lags the cache.

use crate::error::StorageError;
use crate::log::{LogFile, MachineLog};
use crate::machine::MachineIdentity;
use crate::paths::FrayPaths;
use crate::rebuild::{needs_rebuild, rebuild, RebuildReport};
use crate::runtime::RuntimeLog;
use crate::store::{Applied, NewMessage, Store, ThreadRef};
use fray_core::{
    AgentId, AgentPatch, AgentRecord, ChannelId, Envelope, Event, IdGen, IdKind, Job, JobId,
    JobStatus, Message, MessageId, PersistMode, Presence, ProjectConfig, Question, QuestionId,
    QuestionStatus, SessionId, Thread, ThreadId, ThreadKind, ThreadPatch, WakeCondition, WakeId,
    STORAGE_VERSION_MULTI,
};
use std::path::Path;
use tracing::info;

/// Result of `init` against a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// No `.fray/` existed; a fresh project was created.
    CreatedFresh,
    /// `shared/` existed without a local machine id; this machine joined.
    JoinedExisting,
    /// Everything was already in place.
    AlreadyInitialized,
}

/// Open project with its write handles.
pub struct Project {
    paths: FrayPaths,
    config: ProjectConfig,
    machine: MachineIdentity,
    log: MachineLog,
    runtime: RuntimeLog,
    store: Store,
}

/// Decide between fresh-create, join-existing, and no-op by inspecting
/// the directory, then perform it.
pub fn init_project<G: IdGen>(
    project_root: &Path,
    machine_id: &str,
    channel_name: &str,
    id_gen: &G,
    now: i64,
) -> Result<InitOutcome, StorageError> {
    let paths = FrayPaths::new(project_root);

    let has_shared = paths.shared().is_dir();
    let has_machine = paths.machine_id_file().is_file();

    if has_shared && has_machine {
        return Ok(InitOutcome::AlreadyInitialized);
    }

    if has_shared {
        // Join an existing project: claim a machine id, then rebuild so
        // the cache sees every other machine's history (including agent
        // descriptors to seed from)
        let config = read_config(&paths)?;
        std::fs::create_dir_all(paths.local())?;
        MachineIdentity::create(&paths.machine_id_file(), machine_id, now)?;
        std::fs::create_dir_all(paths.machine_dir(machine_id))?;
        rebuild(&paths, &config, now)?;
        info!(machine = machine_id, "joined existing project");
        return Ok(InitOutcome::JoinedExisting);
    }

    // Fresh project
    let config = ProjectConfig::new(
        ChannelId::new(id_gen.next(IdKind::Channel)),
        channel_name,
    );
    std::fs::create_dir_all(paths.machine_dir(machine_id))?;
    std::fs::create_dir_all(paths.local())?;
    std::fs::create_dir_all(paths.routers_dir())?;
    std::fs::create_dir_all(paths.prompts_dir())?;
    std::fs::create_dir_all(paths.llm_dir().join("slash"))?;
    write_config(&paths, &config)?;
    MachineIdentity::create(&paths.machine_id_file(), machine_id, now)?;
    rebuild(&paths, &config, now)?;
    info!(machine = machine_id, channel = channel_name, "initialized project");
    Ok(InitOutcome::CreatedFresh)
}

fn read_config(paths: &FrayPaths) -> Result<ProjectConfig, StorageError> {
    let content = std::fs::read_to_string(paths.config()).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::not_found("project config", paths.config().display().to_string())
        } else {
            StorageError::Io(e)
        }
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn write_config(paths: &FrayPaths, config: &ProjectConfig) -> Result<(), StorageError> {
    let tmp = paths.config().with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(config)?)?;
    std::fs::rename(&tmp, paths.config())?;
    Ok(())
}

impl Project {
    /// Open the project rooted at (or above) `start`, rebuilding the cache
    /// first if any log is newer than it.
    pub fn discover(start: &Path, now: i64) -> Result<Self, StorageError> {
        let paths = FrayPaths::discover(start)
            .ok_or_else(|| StorageError::not_found("project", start.display().to_string()))?;
        Self::open(paths, now)
    }

    pub fn open(paths: FrayPaths, now: i64) -> Result<Self, StorageError> {
        let config = read_config(&paths)?;
        let machine = MachineIdentity::open(&paths.machine_id_file())?;
        if needs_rebuild(&paths) {
            rebuild(&paths, &config, now)?;
        }
        let store = Store::open(&paths.db())?;
        let log = MachineLog::new(paths.machine_dir(machine.id().as_str()));
        let runtime = RuntimeLog::new(paths.runtime_log());
        Ok(Self {
            paths,
            config,
            machine,
            log,
            runtime,
            store,
        })
    }

    pub fn paths(&self) -> &FrayPaths {
        &self.paths
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn machine_id(&self) -> &fray_core::MachineId {
        self.machine.id()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn machine_log(&self) -> &MachineLog {
        &self.log
    }

    /// Writes are refused on legacy single-machine storage to avoid
    /// splitting the log across formats.
    fn gate_writes(&self) -> Result<(), StorageError> {
        if self.config.storage_version < STORAGE_VERSION_MULTI {
            return Err(StorageError::StorageVersion {
                found: self.config.storage_version,
                required: STORAGE_VERSION_MULTI,
            });
        }
        Ok(())
    }

    /// Which file an event belongs to.
    fn route(event: &Event) -> LogFile {
        match event {
            Event::MessageCreated { .. }
            | Event::MessageUpdated { .. }
            | Event::MessageMoved { .. }
            | Event::MessagePinned { .. }
            | Event::MessageUnpinned { .. }
            | Event::MessageDeleted { .. }
            | Event::Reaction { .. }
            | Event::Fave { .. }
            | Event::Unfave { .. }
            | Event::ReadTo { .. } => LogFile::Messages,

            Event::ThreadCreated { .. }
            | Event::ThreadUpdated { .. }
            | Event::Subscribed { .. }
            | Event::Unsubscribed { .. } => LogFile::Threads,

            Event::QuestionCreated { .. } | Event::QuestionUpdated { .. } => LogFile::Questions,

            Event::AgentUpdated { .. }
            | Event::AgentDescriptor { .. }
            | Event::JobCreated { .. }
            | Event::JobUpdated { .. }
            | Event::JobWorkerJoined { .. }
            | Event::JobWorkerLeft { .. }
            | Event::WakeConditionSet { .. }
            | Event::WakeConditionCleared { .. }
            | Event::WakeConditionPaused { .. }
            | Event::WakeConditionResumed { .. }
            | Event::WakeConditionReset { .. }
            | Event::WakeConditionDeleted { .. } => LogFile::AgentState,

            Event::AgentRegistered { .. }
            | Event::SessionStart { .. }
            | Event::SessionEnd { .. }
            | Event::Heartbeat { .. }
            | Event::PresenceChanged { .. } => LogFile::Runtime,
        }
    }

    /// Durably append an event, then fold it into the cache.
    pub fn append(&mut self, event: Event, ts: i64) -> Result<Envelope, StorageError> {
        self.gate_writes()?;
        let seq = self.machine.next_seq()?;
        let envelope = Envelope::new(ts, self.machine.id().clone(), seq, event);
        let file = envelope.event().map(Self::route).unwrap_or(LogFile::Runtime);
        match file {
            LogFile::Runtime => self.runtime.append(&envelope)?,
            shared => self.log.append(shared, &envelope)?,
        }
        self.store.apply_envelope(&envelope)?;
        Ok(envelope)
    }

    // -- messages --

    /// Validate and post a message. Derived fields (`reply_to` resolution,
    /// mentions) must already be computed by the caller's classifier.
    pub fn post_message<G: IdGen>(
        &mut self,
        mut draft: NewMessage,
        id_gen: &G,
        ts: i64,
    ) -> Result<Message, StorageError> {
        self.gate_writes()?;
        let reply_to = self.store.validate_new_message(&draft)?;

        let mut message = Message::new(
            MessageId::new(id_gen.next(IdKind::Message)),
            ts,
            std::mem::take(&mut draft.home),
            draft.from_agent.clone(),
            std::mem::take(&mut draft.body),
        );
        message.kind = draft.kind;
        message.reply_to = reply_to;
        message.mentions = std::mem::take(&mut draft.mentions);
        message.fork_sessions = std::mem::take(&mut draft.fork_sessions);
        message.session_id = draft.session_id.take();
        message.quote_message_guid = draft.quote_message_guid.take();
        message.origin = self.machine.id().clone();

        self.append(
            Event::MessageCreated {
                message: message.clone(),
            },
            ts,
        )?;
        Ok(message)
    }

    pub fn edit_message(
        &mut self,
        reference: &str,
        editor: &AgentId,
        body: String,
        trusted: bool,
        ts: i64,
    ) -> Result<Message, StorageError> {
        self.gate_writes()?;
        let id = self.store.resolve_message(reference)?;
        self.store.validate_edit(&id, editor, trusted)?;
        self.append(
            Event::MessageUpdated {
                id: id.clone(),
                body,
                edited_at: ts,
                editor: Some(editor.clone()),
            },
            ts,
        )?;
        self.store.get_message(id.as_str())
    }

    pub fn move_message(
        &mut self,
        reference: &str,
        to_home: String,
        by: &AgentId,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.gate_writes()?;
        let id = self.store.resolve_message(reference)?;
        if to_home != fray_core::HOME_ROOM {
            self.store.get_thread(&to_home)?;
        }
        self.append(
            Event::MessageMoved {
                id,
                to_home,
                by: by.clone(),
            },
            ts,
        )?;
        Ok(())
    }

    pub fn delete_message(
        &mut self,
        reference: &str,
        by: &AgentId,
        ts: i64,
    ) -> Result<MessageId, StorageError> {
        self.gate_writes()?;
        let id = self.store.resolve_message(reference)?;
        self.append(
            Event::MessageDeleted {
                id: id.clone(),
                by: by.clone(),
            },
            ts,
        )?;
        Ok(id)
    }

    /// Set-valued per `(message, emoji, agent)`: a duplicate add reports
    /// `Unchanged` and skips the append entirely.
    pub fn react(
        &mut self,
        reference: &str,
        emoji: &str,
        agent: &AgentId,
        remove: bool,
        ts: i64,
    ) -> Result<Applied, StorageError> {
        self.gate_writes()?;
        let id = self.store.resolve_message(reference)?;
        let message = self.store.get_message(id.as_str())?;
        let already = message.has_reaction(emoji, agent);
        if (already && !remove) || (!already && remove) {
            return Ok(Applied::Unchanged);
        }
        self.append(
            Event::Reaction {
                message: id,
                emoji: emoji.to_string(),
                agent: agent.clone(),
                removed: remove,
            },
            ts,
        )?;
        Ok(Applied::Changed)
    }

    pub fn pin_message(
        &mut self,
        reference: &str,
        thread: &ThreadRef,
        by: &AgentId,
        unpin: bool,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.gate_writes()?;
        let id = self.store.resolve_message(reference)?;
        let thread = self.store.resolve_thread(thread)?;
        let event = if unpin {
            Event::MessageUnpinned {
                id,
                thread: thread.guid,
                by: by.clone(),
            }
        } else {
            Event::MessagePinned {
                id,
                thread: thread.guid,
                by: by.clone(),
            }
        };
        self.append(event, ts)?;
        Ok(())
    }

    pub fn fave(
        &mut self,
        reference: &str,
        agent: &AgentId,
        unfave: bool,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.gate_writes()?;
        let message = self.store.resolve_message(reference)?;
        let event = if unfave {
            Event::Unfave {
                message,
                agent: agent.clone(),
            }
        } else {
            Event::Fave {
                message,
                agent: agent.clone(),
            }
        };
        self.append(event, ts)?;
        Ok(())
    }

    pub fn read_to(
        &mut self,
        agent: &AgentId,
        home: &str,
        reference: &str,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.gate_writes()?;
        let message = self.store.resolve_message(reference)?;
        self.append(
            Event::ReadTo {
                agent: agent.clone(),
                home: home.to_string(),
                message,
            },
            ts,
        )?;
        Ok(())
    }

    // -- threads --

    pub fn create_thread<G: IdGen>(
        &mut self,
        name: &str,
        parent: Option<&ThreadRef>,
        kind: ThreadKind,
        created_by: &AgentId,
        id_gen: &G,
        ts: i64,
    ) -> Result<Thread, StorageError> {
        self.gate_writes()?;
        let parent_guid = parent
            .map(|p| self.store.resolve_thread(p).map(|t| t.guid))
            .transpose()?;
        let mut thread = Thread::new(
            ThreadId::new(id_gen.next(IdKind::Thread)),
            name.to_lowercase(),
            ts,
            created_by.clone(),
        );
        thread.parent_thread = parent_guid;
        thread.kind = kind;
        self.append(
            Event::ThreadCreated {
                thread: thread.clone(),
            },
            ts,
        )?;
        Ok(thread)
    }

    pub fn update_thread(
        &mut self,
        reference: &ThreadRef,
        patch: ThreadPatch,
        ts: i64,
    ) -> Result<Thread, StorageError> {
        self.gate_writes()?;
        let thread = self.store.resolve_thread(reference)?;
        self.append(
            Event::ThreadUpdated {
                id: thread.guid.clone(),
                patch,
            },
            ts,
        )?;
        self.store.get_thread(thread.guid.as_str())
    }

    pub fn subscribe(
        &mut self,
        agent: &AgentId,
        thread: &ThreadRef,
        unsubscribe: bool,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.gate_writes()?;
        let thread = self.store.resolve_thread(thread)?;
        let event = if unsubscribe {
            Event::Unsubscribed {
                agent: agent.clone(),
                thread: thread.guid,
            }
        } else {
            Event::Subscribed {
                agent: agent.clone(),
                thread: thread.guid,
            }
        };
        self.append(event, ts)?;
        Ok(())
    }

    // -- questions --

    pub fn ask_question<G: IdGen>(
        &mut self,
        asked_by: &AgentId,
        asked_of: Option<AgentId>,
        body: &str,
        home: Option<String>,
        id_gen: &G,
        ts: i64,
    ) -> Result<Question, StorageError> {
        self.gate_writes()?;
        let question = Question {
            guid: QuestionId::new(id_gen.next(IdKind::Question)),
            asked_by: asked_by.clone(),
            asked_of,
            body: body.to_string(),
            home,
            status: QuestionStatus::Open,
            answer: None,
            created_at: ts,
            answered_at: None,
        };
        self.append(
            Event::QuestionCreated {
                question: question.clone(),
            },
            ts,
        )?;
        Ok(question)
    }

    pub fn answer_question(
        &mut self,
        guid: &str,
        answer: String,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.gate_writes()?;
        let question = self.store.get_question(guid)?;
        self.append(
            Event::QuestionUpdated {
                id: question.guid,
                status: Some(QuestionStatus::Answered),
                answer: Some(answer),
            },
            ts,
        )?;
        Ok(())
    }

    // -- agents --

    /// Register locally and publish a descriptor so other machines can
    /// seed this agent on join.
    pub fn register_agent(&mut self, agent: AgentRecord, ts: i64) -> Result<(), StorageError> {
        self.gate_writes()?;
        self.append(
            Event::AgentDescriptor {
                agent_id: agent.agent_id.clone(),
                managed: agent.managed,
                invoke: agent.invoke.clone(),
                avatar: agent.avatar.clone(),
            },
            ts,
        )?;
        self.append(Event::AgentRegistered { agent }, ts)?;
        Ok(())
    }

    pub fn update_agent(
        &mut self,
        agent: &AgentId,
        patch: AgentPatch,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.gate_writes()?;
        self.append(
            Event::AgentUpdated {
                id: agent.clone(),
                patch,
            },
            ts,
        )?;
        Ok(())
    }

    /// `bye`: record departure and apply each wake condition's persist
    /// mode. `persist_until_bye` clears, `persist_restore_on_back`
    /// pauses, the rest stay armed.
    pub fn agent_bye(&mut self, agent: &AgentId, ts: i64) -> Result<(), StorageError> {
        self.gate_writes()?;
        self.update_agent(
            agent,
            AgentPatch {
                left_at: Some(ts),
                ..AgentPatch::default()
            },
            ts,
        )?;
        for condition in self.store.list_wake_conditions(Some(agent.as_str()))? {
            match condition.persist_mode {
                PersistMode::PersistUntilBye => {
                    self.append(Event::WakeConditionCleared { id: condition.guid }, ts)?;
                }
                PersistMode::PersistRestoreOnBack => {
                    if !condition.paused {
                        self.append(Event::WakeConditionPaused { id: condition.guid }, ts)?;
                    }
                }
                PersistMode::None | PersistMode::Persist => {}
            }
        }
        Ok(())
    }

    /// `back`: clear departure and resume conditions paused by `bye`.
    pub fn agent_back(&mut self, agent: &AgentId, ts: i64) -> Result<(), StorageError> {
        self.gate_writes()?;
        self.update_agent(
            agent,
            AgentPatch {
                returned: true,
                last_seen: Some(ts),
                ..AgentPatch::default()
            },
            ts,
        )?;
        for condition in self.store.list_wake_conditions(Some(agent.as_str()))? {
            if condition.paused && condition.persist_mode == PersistMode::PersistRestoreOnBack {
                self.append(Event::WakeConditionResumed { id: condition.guid }, ts)?;
            }
        }
        Ok(())
    }

    pub fn heartbeat(&mut self, agent: &AgentId, at_ms: u64, ts: i64) -> Result<(), StorageError> {
        self.append(
            Event::Heartbeat {
                agent_id: agent.clone(),
                at_ms,
            },
            ts,
        )?;
        Ok(())
    }

    pub fn set_presence(
        &mut self,
        agent: &AgentId,
        presence: Presence,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.append(
            Event::PresenceChanged {
                agent_id: agent.clone(),
                presence,
            },
            ts,
        )?;
        Ok(())
    }

    pub fn session_start(
        &mut self,
        agent: &AgentId,
        session: &SessionId,
        home: Option<String>,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.append(
            Event::SessionStart {
                agent_id: agent.clone(),
                session_id: session.clone(),
                home,
            },
            ts,
        )?;
        Ok(())
    }

    pub fn session_end(
        &mut self,
        agent: &AgentId,
        session: &SessionId,
        exit_code: Option<i32>,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.append(
            Event::SessionEnd {
                agent_id: agent.clone(),
                session_id: session.clone(),
                exit_code,
            },
            ts,
        )?;
        Ok(())
    }

    // -- jobs --

    /// Create a job with its coordination thread.
    pub fn create_job<G: IdGen>(
        &mut self,
        name: &str,
        owner: &AgentId,
        context: Option<serde_json::Value>,
        id_gen: &G,
        ts: i64,
    ) -> Result<Job, StorageError> {
        self.gate_writes()?;
        let thread = self.create_thread(
            &format!("jobs/{name}"),
            None,
            ThreadKind::System,
            owner,
            id_gen,
            ts,
        )?;
        let job = Job {
            guid: JobId::new(id_gen.next(IdKind::Job)),
            name: name.to_string(),
            context,
            owner_agent: owner.clone(),
            status: JobStatus::Running,
            thread_guid: Some(thread.guid),
            created_at: ts,
            completed_at: None,
        };
        self.append(Event::JobCreated { job: job.clone() }, ts)?;
        Ok(job)
    }

    pub fn close_job(
        &mut self,
        job: &JobId,
        status: JobStatus,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.gate_writes()?;
        self.append(
            Event::JobUpdated {
                id: job.clone(),
                status: Some(status),
                completed_at: Some(ts),
            },
            ts,
        )?;
        // Workers leave with the job
        for worker in self.store.job_workers(job)? {
            if worker.left_at.is_none() {
                self.append(
                    Event::JobWorkerLeft {
                        job: job.clone(),
                        agent_id: worker.agent_id,
                    },
                    ts,
                )?;
            }
        }
        Ok(())
    }

    pub fn job_worker_join(
        &mut self,
        job: &JobId,
        base: &str,
        idx: u32,
        ts: i64,
    ) -> Result<AgentId, StorageError> {
        self.gate_writes()?;
        let agent_id = fray_core::worker_agent_id(base, job, idx);
        self.append(
            Event::JobWorkerJoined {
                job: job.clone(),
                agent_id: agent_id.clone(),
                idx,
            },
            ts,
        )?;
        Ok(agent_id)
    }

    // -- wake conditions --

    pub fn set_wake_condition(
        &mut self,
        condition: WakeCondition,
        ts: i64,
    ) -> Result<(), StorageError> {
        self.gate_writes()?;
        self.append(Event::WakeConditionSet { condition }, ts)?;
        Ok(())
    }

    pub fn clear_wake_condition(&mut self, id: &WakeId, ts: i64) -> Result<(), StorageError> {
        self.append(Event::WakeConditionCleared { id: id.clone() }, ts)?;
        Ok(())
    }

    pub fn delete_wake_condition(&mut self, id: &WakeId, ts: i64) -> Result<(), StorageError> {
        self.append(Event::WakeConditionDeleted { id: id.clone() }, ts)?;
        Ok(())
    }

    pub fn pause_wake_condition(&mut self, id: &WakeId, ts: i64) -> Result<(), StorageError> {
        self.append(Event::WakeConditionPaused { id: id.clone() }, ts)?;
        Ok(())
    }

    pub fn resume_wake_condition(&mut self, id: &WakeId, ts: i64) -> Result<(), StorageError> {
        self.append(Event::WakeConditionResumed { id: id.clone() }, ts)?;
        Ok(())
    }

    pub fn reset_wake_condition(&mut self, id: &WakeId, ts: i64) -> Result<(), StorageError> {
        self.append(Event::WakeConditionReset { id: id.clone() }, ts)?;
        Ok(())
    }

    // -- maintenance --

    /// Rebuild the cache and reopen the handle over the fresh file.
    pub fn rebuild(&mut self, now: i64) -> Result<RebuildReport, StorageError> {
        let report = rebuild(&self.paths, &self.config, now)?;
        self.store = Store::open(&self.paths.db())?;
        Ok(report)
    }

    /// Rebuild only when some log is newer than the cache (another
    /// machine synced in, or another process wrote). Returns whether a
    /// rebuild ran.
    pub fn refresh_if_stale(&mut self, now: i64) -> Result<bool, StorageError> {
        if !needs_rebuild(&self.paths) {
            return Ok(false);
        }
        self.rebuild(now)?;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
