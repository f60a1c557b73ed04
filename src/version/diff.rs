//! Field-level diffing of trackable entities.
//!
//! Handlers diff old against new before persisting and skip the ledger
//! entirely when nothing changed, so no empty history entries exist.

use std::collections::BTreeMap;

use serde_json::json;

use crate::types::{FieldChange, Task};

/// Compare two task snapshots and return the changed tracked fields
/// (title, status, assignee) keyed by field name. Timestamps and the
/// immutable reporter are not tracked.
pub fn task_changes(old: &Task, new: &Task) -> BTreeMap<String, FieldChange> {
    let mut changes = BTreeMap::new();

    if old.title != new.title {
        changes.insert(
            "title".to_string(),
            FieldChange {
                from: json!(old.title),
                to: json!(new.title),
            },
        );
    }
    if old.status != new.status {
        changes.insert(
            "status".to_string(),
            FieldChange {
                from: json!(old.status),
                to: json!(new.status),
            },
        );
    }
    if old.assignee != new.assignee {
        changes.insert(
            "assignee".to_string(),
            FieldChange {
                from: json!(old.assignee),
                to: json!(new.assignee),
            },
        );
    }

    changes
}
