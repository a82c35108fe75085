// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fray-engine: pure routing logic.
//!
//! Mention extraction and classification, wake-condition evaluation,
//! spawn decisions, and the per-agent debouncer. Everything here is
//! side-effect free; the daemon and CLI own I/O.

pub mod debounce;
pub mod decision;
pub mod mention;
pub mod prompt;
pub mod router;
pub mod wake;

pub use debounce::{Debouncer, PendingMention};
pub use decision::{decide, DecisionContext, SkipReason, SpawnDecision};
pub use mention::{
    classify, encode_mentions, extract_mentions, Classification, ClassifyContext, Disambiguation,
    MentionClass, MentionHit,
};
pub use prompt::{interpolate, render_wake_prompt, WakePromptInput, DEFAULT_WAKE_TEMPLATE};
pub use router::{router_gate, GateOutcome};
pub use wake::{
    compile_conditions, due_polls, due_timers, evaluate_message, post_trigger, CompiledCondition,
    PostTrigger, WakeHit, WakeReason,
};
