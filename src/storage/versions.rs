//! Document store contract for version records, plus the in-memory
//! implementation used in tests and single-node deployments.

use dashmap::DashMap;

use crate::types::{Error, Result, TaskId, VersionRecord};

/// Contract the version ledger requires from the document store:
/// insert, "find sorted by version descending, limit 1", and a full
/// descending replay per entity id.
pub trait VersionStore: Send + Sync + 'static {
    /// Append a record. Fails with `Conflict` when a record with the
    /// same (entity, version) pair already exists. The ledger's
    /// optimistic retry rests on this.
    fn append(&self, record: VersionRecord) -> Result<()>;

    /// Highest version number recorded for the entity, if any.
    fn latest_version(&self, entity: TaskId) -> Result<Option<u64>>;

    /// All records for the entity, strictly descending by version.
    fn history(&self, entity: TaskId) -> Result<Vec<VersionRecord>>;
}

/// In-memory version store keeping one append-only log per entity.
#[derive(Debug, Default)]
pub struct MemVersionStore {
    logs: DashMap<TaskId, Vec<VersionRecord>>,
}

impl MemVersionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all entities.
    pub fn record_count(&self) -> usize {
        self.logs.iter().map(|entry| entry.value().len()).sum()
    }
}

impl VersionStore for MemVersionStore {
    fn append(&self, record: VersionRecord) -> Result<()> {
        // The entry guard serializes appends per entity, so the
        // duplicate check and the push are atomic.
        let mut log = self.logs.entry(record.id).or_default();
        if log.iter().any(|existing| existing.version == record.version) {
            return Err(Error::Conflict {
                entity: record.id.to_string(),
                version: record.version,
            });
        }
        log.push(record);
        Ok(())
    }

    fn latest_version(&self, entity: TaskId) -> Result<Option<u64>> {
        Ok(self
            .logs
            .get(&entity)
            .and_then(|log| log.iter().map(|record| record.version).max()))
    }

    fn history(&self, entity: TaskId) -> Result<Vec<VersionRecord>> {
        let mut records = self
            .logs
            .get(&entity)
            .map(|log| log.value().clone())
            .unwrap_or_default();
        records.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::types::{Author, FieldChange, UserId};

    fn record(entity: TaskId, version: u64) -> VersionRecord {
        let mut changes = BTreeMap::new();
        changes.insert(
            "title".to_string(),
            FieldChange {
                from: json!("a"),
                to: json!("b"),
            },
        );
        VersionRecord {
            version,
            id: entity,
            changes,
            author: Author {
                id: UserId::random(),
                name: "Ada".to_string(),
                picture: None,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_and_latest() {
        let store = MemVersionStore::new();
        let entity = TaskId::random();
        assert_eq!(store.latest_version(entity).unwrap(), None);

        store.append(record(entity, 1)).unwrap();
        store.append(record(entity, 2)).unwrap();
        assert_eq!(store.latest_version(entity).unwrap(), Some(2));
        assert_eq!(store.record_count(), 2);
    }

    #[test]
    fn test_duplicate_version_is_conflict() {
        let store = MemVersionStore::new();
        let entity = TaskId::random();
        store.append(record(entity, 1)).unwrap();

        let err = store.append(record(entity, 1)).unwrap_err();
        assert!(matches!(err, Error::Conflict { version: 1, .. }));
        assert_eq!(store.record_count(), 1);
    }

    #[test]
    fn test_history_descends() {
        let store = MemVersionStore::new();
        let entity = TaskId::random();
        for version in 1..=5 {
            store.append(record(entity, version)).unwrap();
        }

        let history = store.history(entity).unwrap();
        let versions: Vec<u64> = history.iter().map(|r| r.version).collect();
        assert_eq!(versions, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_entities_are_isolated() {
        let store = MemVersionStore::new();
        let first = TaskId::random();
        let second = TaskId::random();
        store.append(record(first, 1)).unwrap();

        assert_eq!(store.latest_version(second).unwrap(), None);
        assert!(store.history(second).unwrap().is_empty());
    }
}
