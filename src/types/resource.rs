//! Resource hierarchy rows: workspace, page, task.
//!
//! Pages form a forest via nullable parent ids. Relationships are id
//! references resolved through the store, never in-memory object graphs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PageId, TaskId, UserId, WorkspaceId};

/// Top-level tenant container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace identifier.
    pub id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// User who created the workspace.
    pub owner: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker. A non-null value schedules future hard
    /// deletion once the retention grace period has elapsed.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Workspace {
    /// Create a workspace with a fresh id.
    pub fn new(name: impl Into<String>, owner: UserId) -> Self {
        Self {
            id: WorkspaceId::random(),
            name: name.into(),
            owner,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Whether the workspace is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Structural variant of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// Free-form document page.
    Text,
    /// Kanban-style board page.
    Board,
    /// Grouping container. Groups have no parent and never contain
    /// another group: exactly one level deep.
    Group,
}

/// Document node below a workspace or another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page identifier.
    pub id: PageId,
    /// Workspace the page belongs to.
    pub workspace: WorkspaceId,
    /// Parent page, when the page is nested below another page rather
    /// than sitting directly in the workspace.
    pub parent: Option<PageId>,
    /// Structural variant.
    pub kind: PageKind,
    /// Display title.
    pub title: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Page {
    /// Create a page with a fresh id.
    pub fn new(
        workspace: WorkspaceId,
        parent: Option<PageId>,
        kind: PageKind,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: PageId::random(),
            workspace,
            parent,
            kind,
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    NotDone,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

/// Work item on a page. Tasks carry no grants of their own; access is
/// governed by the owning page's grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Page the task lives on.
    pub page: PageId,
    /// Display title.
    pub title: String,
    /// Completion state.
    pub status: TaskStatus,
    /// User the task is assigned to, if any.
    pub assignee: Option<UserId>,
    /// User who created the task. Set at creation, immutable.
    pub reporter: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last field update time.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with a fresh id. The creator becomes the reporter
    /// and the status starts at not-done.
    pub fn new(
        page: PageId,
        title: impl Into<String>,
        reporter: UserId,
        assignee: Option<UserId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::random(),
            page,
            title: title.into(),
            status: TaskStatus::NotDone,
            assignee,
            reporter,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workspace_is_live() {
        let workspace = Workspace::new("Acme", UserId::random());
        assert!(!workspace.is_deleted());
        assert_eq!(workspace.name, "Acme");
    }

    #[test]
    fn test_new_task_defaults() {
        let reporter = UserId::random();
        let task = Task::new(PageId::random(), "Ship it", reporter, None);
        assert_eq!(task.status, TaskStatus::NotDone);
        assert_eq!(task.reporter, reporter);
        assert!(task.assignee.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::NotDone).unwrap(),
            "\"not_done\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"done\"");
    }
}
