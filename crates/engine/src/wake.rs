// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wake-condition evaluation.
//!
//! Conditions are long-lived predicates stored in the cache; the daemon
//! evaluates them against new messages (on_mention, pattern), the timer
//! tick (after), and the poll schedule (prompt). Evaluation is pure;
//! router calls and spawns happen in the daemon.

use fray_core::{Message, PersistMode, Thread, WakeCondition, WakeType};
use regex::Regex;
use tracing::warn;

/// A condition with its pattern pre-compiled. Conditions whose pattern
/// fails to compile are dropped from evaluation with a warning.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    pub condition: WakeCondition,
    pub regex: Option<Regex>,
}

/// Why a condition fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WakeReason {
    AuthorMatch,
    TimerExpired,
    PatternMatch {
        /// A pattern with `prompt_text` upgrades to a two-stage filter;
        /// the daemon asks the router before spawning.
        needs_router: bool,
    },
    PollDue,
}

/// A satisfied condition nominating its agent for spawn.
#[derive(Debug, Clone)]
pub struct WakeHit {
    pub condition: WakeCondition,
    pub reason: WakeReason,
}

/// What happens to the condition after it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTrigger {
    Clear,
    Keep,
}

pub fn post_trigger(condition: &WakeCondition) -> PostTrigger {
    match condition.persist_mode {
        PersistMode::None => PostTrigger::Clear,
        PersistMode::Persist
        | PersistMode::PersistUntilBye
        | PersistMode::PersistRestoreOnBack => PostTrigger::Keep,
    }
}

pub fn compile_conditions(conditions: &[WakeCondition]) -> Vec<CompiledCondition> {
    conditions
        .iter()
        .map(|condition| {
            let regex = match (&condition.wake_type, &condition.pattern) {
                (WakeType::Pattern, Some(pattern)) => match Regex::new(pattern) {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        warn!(
                            condition = %condition.guid,
                            pattern = %pattern,
                            error = %e,
                            "invalid wake pattern, condition will not match"
                        );
                        None
                    }
                },
                _ => None,
            };
            CompiledCondition {
                condition: condition.clone(),
                regex,
            }
        })
        .collect()
}

/// Scope check: explicit thread scope, or every thread except `meta/`
/// handoff space. `thread` is the message's home thread, `None` for the
/// room.
fn in_scope(condition: &WakeCondition, message: &Message, thread: Option<&Thread>) -> bool {
    if let Some(scope) = &condition.in_thread {
        return message.home == scope.as_str();
    }
    match thread {
        Some(t) => !t.is_meta(),
        None => true,
    }
}

/// Evaluate message-armed conditions (on_mention and pattern) against a
/// new post.
pub fn evaluate_message(
    compiled: &[CompiledCondition],
    message: &Message,
    thread: Option<&Thread>,
) -> Vec<WakeHit> {
    let mut hits = Vec::new();
    for entry in compiled {
        let condition = &entry.condition;
        if condition.paused {
            continue;
        }
        // Waking an agent off its own post would loop forever
        if condition.agent_id == message.from_agent {
            continue;
        }
        if !in_scope(condition, message, thread) {
            continue;
        }

        match condition.wake_type {
            WakeType::OnMention => {
                let author_matches = condition.on_agents.is_empty()
                    || condition.on_agents.iter().any(|a| *a == message.from_agent);
                if author_matches {
                    hits.push(WakeHit {
                        condition: condition.clone(),
                        reason: WakeReason::AuthorMatch,
                    });
                }
            }
            WakeType::Pattern => {
                if let Some(regex) = &entry.regex {
                    if regex.is_match(&message.body) {
                        hits.push(WakeHit {
                            condition: condition.clone(),
                            reason: WakeReason::PatternMatch {
                                needs_router: condition.use_router
                                    || condition.prompt_text.is_some(),
                            },
                        });
                    }
                }
            }
            WakeType::After | WakeType::Prompt => {}
        }
    }
    hits
}

/// Timer-armed conditions whose deadline has passed.
pub fn due_timers(conditions: &[WakeCondition], now_ts: i64) -> Vec<WakeHit> {
    conditions
        .iter()
        .filter(|c| {
            !c.paused
                && c.wake_type == WakeType::After
                && c.expires_at.is_some_and(|deadline| deadline <= now_ts)
        })
        .map(|c| WakeHit {
            condition: c.clone(),
            reason: WakeReason::TimerExpired,
        })
        .collect()
}

/// Prompt-armed conditions due for an LLM poll.
pub fn due_polls(conditions: &[WakeCondition], now_ts: i64) -> Vec<WakeHit> {
    conditions
        .iter()
        .filter(|c| {
            !c.paused
                && c.wake_type == WakeType::Prompt
                && now_ts.saturating_sub(c.last_polled_at) >= (c.poll_interval_ms() / 1000) as i64
        })
        .map(|c| WakeHit {
            condition: c.clone(),
            reason: WakeReason::PollDue,
        })
        .collect()
}

#[cfg(test)]
#[path = "wake_tests.rs"]
mod tests;
