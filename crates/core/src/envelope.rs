// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL envelope and the deterministic merge key.
//!
//! Every log line is one JSON object `{"type": ..., "ts": ..., "origin":
//! ..., "seq": ..., ...body}`. The envelope deserializer peels off the
//! ordering fields, then tries the typed [`Event`] sum; a line whose `type`
//! is unrecognized is preserved verbatim as [`EventBody::Unknown`] so a
//! rebuild can rewrite it untouched.

use crate::{Event, MachineId};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a log line: a typed event or a preserved unknown record.
#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
    Event(Event),
    /// Unrecognized `type`; the object (minus envelope fields) is kept
    /// verbatim and round-trips through rebuild.
    Unknown(Value),
}

impl EventBody {
    pub fn as_event(&self) -> Option<&Event> {
        match self {
            EventBody::Event(ev) => Some(ev),
            EventBody::Unknown(_) => None,
        }
    }

    /// Wire discriminator, for both known and unknown records.
    pub fn type_name(&self) -> &str {
        match self {
            EventBody::Event(ev) => ev.type_name(),
            EventBody::Unknown(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }
}

/// A durable log record: ordering fields plus the event body.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Unix seconds.
    pub ts: i64,
    /// Machine id that authored this line.
    pub origin: MachineId,
    /// Per-machine monotonic sequence number.
    pub seq: u64,
    pub body: EventBody,
}

impl Envelope {
    pub fn new(ts: i64, origin: MachineId, seq: u64, event: Event) -> Self {
        Self {
            ts,
            origin,
            seq,
            body: EventBody::Event(event),
        }
    }

    pub fn event(&self) -> Option<&Event> {
        self.body.as_event()
    }

    /// Merge ordering key; `file_index` breaks the final tie between files
    /// scanned in a fixed directory order.
    pub fn merge_key(&self, file_index: u32) -> MergeKey {
        MergeKey {
            ts: self.ts,
            origin: self.origin.as_str().to_string(),
            seq: self.seq,
            file_index,
        }
    }
}

/// Total order over converged content: `(ts, origin, seq, file_index)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MergeKey {
    pub ts: i64,
    pub origin: String,
    pub seq: u64,
    pub file_index: u32,
}

impl Serialize for Envelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match &self.body {
            EventBody::Event(ev) => {
                serde_json::to_value(ev).map_err(serde::ser::Error::custom)?
            }
            EventBody::Unknown(value) => value.clone(),
        };
        let mut map = match body {
            Value::Object(fields) => fields,
            other => {
                return Err(serde::ser::Error::custom(format!(
                    "envelope body must be an object, got {other}"
                )))
            }
        };
        map.insert("ts".to_string(), Value::from(self.ts));
        map.insert("origin".to_string(), Value::from(self.origin.as_str()));
        map.insert("seq".to_string(), Value::from(self.seq));
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = serde_json::Map::deserialize(deserializer)?;
        if !map.contains_key("type") {
            return Err(D::Error::missing_field("type"));
        }
        let ts = map
            .remove("ts")
            .and_then(|v| v.as_i64())
            .unwrap_or_default();
        let origin = map
            .remove("origin")
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        let seq = map
            .remove("seq")
            .and_then(|v| v.as_u64())
            .unwrap_or_default();

        let value = Value::Object(map);
        let body = match serde_json::from_value::<Event>(value.clone()) {
            Ok(ev) => EventBody::Event(ev),
            Err(_) => EventBody::Unknown(value),
        };

        Ok(Envelope {
            ts,
            origin: MachineId::new(origin),
            seq,
            body,
        })
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
