//! Append-only version ledger with monotone version assignment.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::storage::VersionStore;
use crate::types::{Author, Error, FieldChange, Result, TaskId, VersionRecord};

/// Default bound on read-increment retries after version collisions.
pub const DEFAULT_APPEND_ATTEMPTS: u32 = 3;

/// Per-entity version ledger over a document store.
///
/// Version assignment is optimistic: read the current maximum, append
/// max + 1, and retry on `Conflict` when a concurrent writer claimed
/// the number first. After the configured number of collisions the
/// `Conflict` surfaces to the caller.
#[derive(Debug)]
pub struct Ledger<V: VersionStore> {
    store: Arc<V>,
    append_attempts: u32,
    max_replay: usize,
}

impl<V: VersionStore> Ledger<V> {
    /// Create a ledger with default limits.
    pub fn new(store: Arc<V>) -> Self {
        Self {
            store,
            append_attempts: DEFAULT_APPEND_ATTEMPTS,
            max_replay: usize::MAX,
        }
    }

    /// Override the collision retry bound.
    pub fn with_append_attempts(mut self, attempts: u32) -> Self {
        self.append_attempts = attempts.max(1);
        self
    }

    /// Cap how many records a single history replay returns.
    pub fn with_max_replay(mut self, max_replay: usize) -> Self {
        self.max_replay = max_replay.max(1);
        self
    }

    /// Append a change record for `entity` and return it with its
    /// assigned version number.
    ///
    /// Callers diff old against new themselves and must not call this
    /// with an empty change set.
    pub fn record_change(
        &self,
        entity: TaskId,
        changes: BTreeMap<String, FieldChange>,
        author: Author,
    ) -> Result<VersionRecord> {
        if changes.is_empty() {
            return Err(Error::invalid_input("empty change set"));
        }

        let metrics = crate::system::metrics::Metrics::global();
        let mut last_conflict = None;
        for _ in 0..self.append_attempts {
            let version = self.store.latest_version(entity)?.map_or(1, |max| max + 1);
            let record = VersionRecord {
                version,
                id: entity,
                changes: changes.clone(),
                author: author.clone(),
                created_at: Utc::now(),
            };
            match self.store.append(record.clone()) {
                Ok(()) => {
                    metrics.versions.records_appended.inc();
                    debug!(entity = %entity, version, "version recorded");
                    return Ok(record);
                }
                Err(err @ Error::Conflict { .. }) => {
                    metrics.versions.collisions.inc();
                    last_conflict = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        warn!(entity = %entity, attempts = self.append_attempts, "version collision retries exhausted");
        Err(last_conflict
            .unwrap_or_else(|| Error::internal("version append loop ended without outcome")))
    }

    /// Replay the entity's records, strictly descending by version.
    pub fn history(&self, entity: TaskId) -> Result<Vec<VersionRecord>> {
        crate::system::metrics::Metrics::global()
            .versions
            .history_replays
            .inc();
        let mut records = self.store.history(entity)?;
        if records.len() > self.max_replay {
            warn!(
                entity = %entity,
                total = records.len(),
                returned = self.max_replay,
                "history replay truncated"
            );
            records.truncate(self.max_replay);
        }
        Ok(records)
    }
}
