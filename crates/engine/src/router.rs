// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Router assessment gate for pattern+prompt wake conditions.
//!
//! The router is an untrusted external collaborator: every failure path
//! degrades to "do spawn" with confidence 0.5 so a broken router never
//! silences wakes.

use fray_adapters::router::RouterAdapter;
use fray_core::WakeCondition;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub proceed: bool,
    pub confidence: f32,
    /// The router failed and the graceful default applied.
    pub degraded: bool,
}

/// Ask the router whether a pattern match should actually spawn.
pub fn router_gate(
    adapter: &dyn RouterAdapter,
    condition: &WakeCondition,
    message_body: &str,
) -> GateOutcome {
    let Some(prompt) = condition.prompt_text.as_deref() else {
        return GateOutcome {
            proceed: true,
            confidence: 1.0,
            degraded: false,
        };
    };

    match adapter.assess(prompt, message_body) {
        Ok(verdict) => GateOutcome {
            proceed: verdict.should_wake,
            confidence: verdict.confidence,
            degraded: false,
        },
        Err(e) => {
            warn!(
                condition = %condition.guid,
                error = %e,
                "router assessment failed, defaulting to spawn"
            );
            GateOutcome {
                proceed: true,
                confidence: 0.5,
                degraded: true,
            }
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
