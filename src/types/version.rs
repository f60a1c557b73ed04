//! Version record types: the stable JSON contract consumed by any
//! history UI.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{TaskId, UserId};

/// Old and new value of a single changed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Value before the change.
    pub from: Value,
    /// Value after the change.
    pub to: Value,
}

/// Snapshot of the acting user at the time of the change. Captured into
/// the record because the identity component may change names and
/// pictures later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Acting user id.
    pub id: UserId,
    /// Display name at the time of the change.
    pub name: String,
    /// Avatar URL at the time of the change, if any.
    pub picture: Option<String>,
}

/// One append-only entry in an entity's version ledger.
///
/// Serialized shape:
/// `{ "version": int>=1, "id": <entity-id>, "changes": { "<field>":
/// {"from": any, "to": any}, ... }, "author": {...}, "createdAt": ts }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Monotonically increasing version number, starting at 1.
    pub version: u64,
    /// Entity the record belongs to. Weak reference by id only.
    pub id: TaskId,
    /// Changed fields, keyed by field name.
    pub changes: BTreeMap<String, FieldChange>,
    /// Acting user snapshot.
    pub author: Author,
    /// When the record was appended.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> VersionRecord {
        let mut changes = BTreeMap::new();
        changes.insert(
            "status".to_string(),
            FieldChange {
                from: json!("not_done"),
                to: json!("done"),
            },
        );
        VersionRecord {
            version: 1,
            id: TaskId::random(),
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
    fn test_record_wire_shape() {
        let record = sample_record();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["version"], json!(1));
        assert_eq!(value["id"], json!(record.id.to_string()));
        assert_eq!(value["changes"]["status"]["from"], json!("not_done"));
        assert_eq!(value["changes"]["status"]["to"], json!("done"));
        assert_eq!(value["author"]["name"], json!("Ada"));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_record_round_trips() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: VersionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
