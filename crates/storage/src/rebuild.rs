// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic rebuild: fold every machine's logs into a fresh SQLite
//! file and swap it in atomically.
//!
//! Ordering is the merge key `(ts, origin, seq, file_index)` where
//! `file_index` is the machine's position in the sorted machine listing.
//! Two rebuilds over the same inputs produce equal query results.

use crate::checksum;
use crate::error::StorageError;
use crate::log::{scan_log, LogFile};
use crate::paths::FrayPaths;
use crate::runtime::RuntimeLog;
use crate::store::{Applied, Store};
use fray_core::{Envelope, MachineId, MergeKey, ProjectConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct RebuildReport {
    /// Records applied across all files.
    pub records: usize,
    /// GUIDs observed more than once with conflicting content.
    pub collisions: Vec<String>,
    /// Shared files that no longer match `checksums.json`.
    pub checksum_mismatches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CollisionLog {
    incidents: Vec<CollisionIncident>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollisionIncident {
    guid: String,
    observed_at: i64,
}

/// Whether any log mtime is newer than the cache's (main file or WAL
/// sidecar, whichever was written last).
pub fn needs_rebuild(paths: &FrayPaths) -> bool {
    let db = paths.db();
    let db_mtime = [db.clone(), db.with_extension("db-wal")]
        .iter()
        .filter_map(|p| std::fs::metadata(p).and_then(|m| m.modified()).ok())
        .max();
    let Some(db_mtime) = db_mtime else {
        return true;
    };
    let mut candidates: Vec<std::path::PathBuf> = vec![paths.runtime_log()];
    if let Ok(machines) = paths.list_machines() {
        for machine in machines {
            let dir = paths.machine_dir(&machine);
            for file in LogFile::shared() {
                candidates.push(dir.join(file.file_name()));
            }
        }
    }
    candidates.into_iter().any(|path| {
        std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .is_ok_and(|mtime| mtime > db_mtime)
    })
}

/// Rebuild the cache from all per-machine logs plus the runtime overlay.
///
/// `now` stamps collision incidents. Individual unreadable records were
/// already skipped by the scanner; rebuild itself never aborts the
/// project over record content.
pub fn rebuild(
    paths: &FrayPaths,
    config: &ProjectConfig,
    now: i64,
) -> Result<RebuildReport, StorageError> {
    let mut report = RebuildReport {
        checksum_mismatches: checksum::verify_manifest(paths)?,
        ..RebuildReport::default()
    };

    let staging_path = paths.db().with_extension("db.rebuild");
    let _ = std::fs::remove_file(&staging_path);
    let store = Store::open_rebuild_target(&staging_path)?;

    let machines = paths.list_machines()?;

    // Shared files in order: messages, threads, questions, agent-state.
    // Within each, all machines merged by (ts, origin, seq, file_index).
    for file in LogFile::shared() {
        let mut merged: Vec<(MergeKey, Envelope)> = Vec::new();
        for (file_index, machine) in machines.iter().enumerate() {
            let path = paths.machine_dir(machine).join(file.file_name());
            for record in scan_log(&path)? {
                let mut envelope = record.envelope;
                let resolved = config.resolve_machine(envelope.origin.as_str());
                if resolved != envelope.origin.as_str() {
                    envelope.origin = MachineId::new(resolved.to_string());
                    // A renamed machine's rows follow it
                    if let fray_core::EventBody::Event(fray_core::Event::MessageCreated {
                        message,
                    }) = &mut envelope.body
                    {
                        message.origin = envelope.origin.clone();
                    }
                }
                merged.push((envelope.merge_key(file_index as u32), envelope));
            }
        }
        merged.sort_by(|a, b| a.0.cmp(&b.0));

        for (_, envelope) in merged {
            report.records += 1;
            if let Applied::Collision(guid) = store.apply_envelope(&envelope)? {
                warn!(guid = %guid, "guid collision during rebuild");
                report.collisions.push(guid);
            }
        }
    }

    // Local runtime overlay: registrations, sessions, heartbeats, presence
    for record in RuntimeLog::new(paths.runtime_log()).scan()? {
        report.records += 1;
        if let Applied::Collision(guid) = store.apply_envelope(&record.envelope)? {
            warn!(guid = %guid, "guid collision in runtime overlay");
            report.collisions.push(guid);
        }
    }

    recompute_derived(&store)?;
    drop(store);

    // Atomic swap; stale WAL sidecars of the old cache go with it
    let db = paths.db();
    let _ = std::fs::remove_file(db.with_extension("db-wal"));
    let _ = std::fs::remove_file(db.with_extension("db-shm"));
    std::fs::rename(&staging_path, db)?;

    if !report.collisions.is_empty() {
        record_collisions(paths, &report.collisions, now)?;
    }
    checksum::write_manifest(paths)?;

    info!(
        records = report.records,
        collisions = report.collisions.len(),
        "rebuild complete"
    );
    Ok(report)
}

/// Recompute derived columns after the fold.
fn recompute_derived(store: &Store) -> Result<(), StorageError> {
    let conn = store.conn();

    // Thread activity derives from retained messages, not replay order
    conn.execute(
        "UPDATE threads SET last_activity_at = MAX(created_at, \
         COALESCE((SELECT MAX(ts) FROM messages WHERE home = threads.guid), 0))",
        [],
    )?;

    // A watermark pointing at a message that no longer exists advances to
    // the most recent retained message
    conn.execute(
        "UPDATE agents SET mention_watermark = \
         (SELECT id FROM messages ORDER BY ts DESC, id DESC LIMIT 1) \
         WHERE mention_watermark IS NOT NULL \
         AND mention_watermark NOT IN (SELECT id FROM messages)",
        [],
    )?;
    Ok(())
}

/// Append incidents to `local/collisions.json`. Never auto-remediates.
fn record_collisions(
    paths: &FrayPaths,
    guids: &[String],
    now: i64,
) -> Result<(), StorageError> {
    let path = paths.collisions();
    let mut log: CollisionLog = match std::fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CollisionLog::default(),
        Err(e) => return Err(e.into()),
    };
    for guid in guids {
        log.incidents.push(CollisionIncident {
            guid: guid.clone(),
            observed_at: now,
        });
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(&log)?)?;
    Ok(())
}

#[cfg(test)]
#[path = "rebuild_tests.rs"]
mod tests;
