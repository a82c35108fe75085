// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawn decisions.
//!
//! Pure function from (classification, agent record, thread ownership)
//! to launch / enqueue / skip. The daemon owns the side effects.

use crate::mention::MentionClass;
use fray_core::AgentRecord;

/// Why an agent was not launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Inert classification (self, CC, ambiguous, none)
    InertClass,
    /// No driver; left for human pickup
    NotManaged,
    /// Agent said `bye` and has not come `back`
    Away,
    /// Thread owner gate: only the owner and humans trigger spawns here
    OwnershipGate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnDecision {
    /// Launch or resume a session now.
    Launch,
    /// Agent is busy; queue the mention on the debouncer.
    Enqueue,
    /// No spawn; the mention watermark still advances.
    Skip(SkipReason),
}

pub struct DecisionContext<'a> {
    /// The candidate recipient.
    pub agent: &'a AgentRecord,
    pub class: MentionClass,
    /// The posting agent.
    pub poster: &'a str,
    /// Unmanaged posters are humans for the ownership rule.
    pub poster_is_human: bool,
    /// `owner_agent` of the thread the message landed in, if any.
    pub thread_owner: Option<&'a str>,
}

/// Decide what to do for one candidate recipient of one message.
pub fn decide(ctx: &DecisionContext<'_>) -> SpawnDecision {
    if ctx.class.is_inert() {
        return SpawnDecision::Skip(SkipReason::InertClass);
    }

    if !ctx.agent.managed {
        return SpawnDecision::Skip(SkipReason::NotManaged);
    }

    if ctx.agent.is_away() {
        return SpawnDecision::Skip(SkipReason::Away);
    }

    // In an owned thread, spawns for agents other than the owner are
    // triggered only by the owner or by humans; other managed agents'
    // mentions are informational. The owner itself stays reachable.
    if let Some(owner) = ctx.thread_owner {
        let allowed = ctx.poster_is_human
            || ctx.poster == owner
            || ctx.agent.agent_id.as_str() == owner;
        if !allowed {
            return SpawnDecision::Skip(SkipReason::OwnershipGate);
        }
    }

    if ctx.agent.presence.is_busy() {
        return SpawnDecision::Enqueue;
    }

    SpawnDecision::Launch
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
