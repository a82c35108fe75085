// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions.
//!
//! Every Fray entity carries a prefixed identifier of shape
//! `<kind>-<12-char-base36>`: `msg-03f8k2m1qz7v`, `thrd-...`, etc. The
//! base36 tail is derived from a ULID so ids sort roughly by creation time
//! within a machine. IDs are globally unique; collisions observed during
//! rebuild are logged as integrity incidents, never auto-remediated.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Entity kinds with their id prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Message,
    Thread,
    User,
    Job,
    Question,
    Channel,
    Attachment,
    Wake,
}

impl IdKind {
    /// The id prefix for this kind, without the trailing dash.
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Message => "msg",
            IdKind::Thread => "thrd",
            IdKind::User => "usr",
            IdKind::Job => "job",
            IdKind::Question => "qstn",
            IdKind::Channel => "ch",
            IdKind::Attachment => "att",
            IdKind::Wake => "wake",
        }
    }
}

/// Number of base36 characters in an id tail.
pub const ID_TAIL_LEN: usize = 12;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Encode the low bits of `value` as exactly [`ID_TAIL_LEN`] base36 chars.
fn base36_tail(mut value: u128) -> String {
    let mut buf = [b'0'; ID_TAIL_LEN];
    for slot in buf.iter_mut().rev() {
        *slot = BASE36[(value % 36) as usize];
        value /= 36;
    }
    // Tail is ASCII by construction
    String::from_utf8_lossy(&buf).into_owned()
}

/// Trait for truncating identifiers to a short prefix.
pub trait ShortId {
    /// Returns a string slice truncated to at most `n` characters.
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        if self.len() <= n {
            self
        } else {
            &self[..n]
        }
    }
}

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `short()`, `Display`, `From<String>`,
/// `From<&str>`, `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>`
/// implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns a string slice truncated to at most `n` characters.
            pub fn short(&self, n: usize) -> &str {
                if self.0.len() <= n {
                    &self.0
                } else {
                    &self.0[..n]
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Generates prefixed entity identifiers.
pub trait IdGen: Clone + Send + Sync {
    fn next(&self, kind: IdKind) -> String;
}

/// ULID-backed generator for production use.
///
/// The ULID's timestamp bits keep ids of one machine roughly ordered by
/// creation; the random bits make cross-machine collisions negligible.
#[derive(Clone, Default)]
pub struct UlidGen;

impl IdGen for UlidGen {
    fn next(&self, kind: IdKind) -> String {
        let tail = base36_tail(u128::from(ulid::Ulid::new()));
        format!("{}-{}", kind.prefix(), tail)
    }
}

/// Sequential ID generator for testing.
#[derive(Clone)]
pub struct SequentialIdGen {
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self, kind: IdKind) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", kind.prefix(), base36_tail(u128::from(n)))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
