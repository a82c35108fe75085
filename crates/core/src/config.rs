// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration: `.fray/fray-config.json`.

use crate::ChannelId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Single-machine legacy layout. Refuses writes until migrated.
pub const STORAGE_VERSION_SINGLE: u32 = 1;
/// Multi-machine layout with per-machine logs.
pub const STORAGE_VERSION_MULTI: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub storage_version: u32,
    pub channel_id: ChannelId,
    pub channel_name: String,
    /// Old machine id → new machine id, applied during rebuild.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub machine_aliases: HashMap<String, String>,
    /// Opaque sync backend descriptor (git, iCloud, …). Fray never syncs
    /// itself; this records what the out-of-band transport is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub known_agents: Vec<String>,
}

impl ProjectConfig {
    pub fn new(channel_id: ChannelId, channel_name: impl Into<String>) -> Self {
        Self {
            storage_version: STORAGE_VERSION_MULTI,
            channel_id,
            channel_name: channel_name.into(),
            machine_aliases: HashMap::new(),
            sync: None,
            known_agents: Vec::new(),
        }
    }

    /// Resolve a machine id through the alias map (one hop).
    pub fn resolve_machine<'a>(&'a self, id: &'a str) -> &'a str {
        self.machine_aliases.get(id).map_or(id, String::as_str)
    }
}
