//! Core identifier and domain types shared across the crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;
pub mod grant;
pub mod resource;
pub mod version;

pub use error::{Denial, Error, Result};
pub use grant::{Grant, Role};
pub use resource::{Page, PageKind, Task, TaskStatus, Workspace};
pub use version::{Author, FieldChange, VersionRecord};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// The raw UUID backing this identifier.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Opaque identifier of a principal. Owned by the external identity
    /// component; this crate only stores it as a foreign reference.
    UserId
);

define_id!(
    /// Identifier of a workspace, the root of the resource hierarchy.
    WorkspaceId
);

define_id!(
    /// Identifier of a page within a workspace.
    PageId
);

define_id!(
    /// Identifier of a task on a page.
    TaskId
);

/// The kind of resource an operation touched, used in diagnostics and
/// denial details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Top-level tenant container.
    Workspace,
    /// Document node below a workspace or another page.
    Page,
    /// Work item on a page.
    Task,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Workspace => "workspace",
            ResourceKind::Page => "page",
            ResourceKind::Task => "task",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_matches_uuid() {
        let raw = Uuid::new_v4();
        let id = WorkspaceId::from(raw);
        assert_eq!(id.to_string(), raw.to_string());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = TaskId::random();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn test_resource_kind_display() {
        assert_eq!(ResourceKind::Workspace.to_string(), "workspace");
        assert_eq!(ResourceKind::Page.to_string(), "page");
        assert_eq!(ResourceKind::Task.to_string(), "task");
    }
}
