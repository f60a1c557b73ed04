//! Task operations: creation, tracked field updates, history replay.
//!
//! Updates follow the pipeline from the component overview: resolve
//! access through the owning page, diff old against new, append to the
//! version ledger, persist the entity, broadcast to the task's topic.

use tracing::info;

use crate::comms::Broadcaster;
use crate::security::{resolve, resolve_task, PageScope};
use crate::storage::{RelationalStore, VersionStore};
use crate::types::{
    Author, Denial, Error, PageId, Result, Role, Task, TaskId, TaskStatus, UserId, VersionRecord,
};
use crate::version::{task_changes, Ledger};

/// Field changes a task update may carry. Absent fields stay untouched;
/// the reporter has no patch field and is immutable by construction.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// New assignee; `Some(None)` clears the assignment.
    pub assignee: Option<Option<UserId>>,
}

impl TaskPatch {
    fn apply(&self, task: &Task) -> Task {
        let mut updated = task.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(assignee) = self.assignee {
            updated.assignee = assignee;
        }
        updated
    }
}

/// Create a task on a page. The creator becomes the immutable reporter;
/// member or better on the owning page is required.
pub fn create(
    store: &RelationalStore,
    actor: UserId,
    page: PageId,
    title: impl Into<String>,
    assignee: Option<UserId>,
) -> Result<Task> {
    let title = title.into();
    if title.trim().is_empty() {
        return Err(Error::invalid_input("task title must not be empty"));
    }

    store.transaction(|tables| {
        let resolved = resolve::<PageScope>(tables, page, actor)?;
        require_member(resolved.role())?;
        let task = Task::new(page, title.clone(), actor, assignee);
        tables.put_task(task.clone());
        info!(task = %task.id, page = %page, reporter = %actor, "task created");
        Ok(task)
    })
}

/// Apply a patch to a task's tracked fields.
///
/// When nothing actually changes the whole pipeline is skipped and
/// `Ok(None)` is returned: no version record, no entity write, no
/// broadcast. Otherwise the ledger append happens inside the entity
/// transaction, so a ledger failure aborts the update, and the appended
/// record is then broadcast to the task's topic.
pub fn update<V: VersionStore>(
    store: &RelationalStore,
    ledger: &Ledger<V>,
    broadcaster: &Broadcaster,
    author: &Author,
    task: TaskId,
    patch: TaskPatch,
) -> Result<Option<VersionRecord>> {
    let record = store.transaction(|tables| {
        let (current, grant) = resolve_task(tables, task, author.id)?;
        require_member(grant.role)?;

        let mut updated = patch.apply(&current);
        let changes = task_changes(&current, &updated);
        if changes.is_empty() {
            return Ok(None);
        }

        let record = ledger.record_change(task, changes, author.clone())?;
        updated.updated_at = record.created_at;
        tables.put_task(updated);
        info!(task = %task, version = record.version, "task updated");
        Ok(Some(record))
    })?;

    if let Some(record) = &record {
        broadcaster.broadcast(&task.to_string(), record);
    }
    Ok(record)
}

/// Replay a task's change history, newest first. Any grant on the
/// owning page suffices to read it.
pub fn history<V: VersionStore>(
    store: &RelationalStore,
    ledger: &Ledger<V>,
    actor: UserId,
    task: TaskId,
) -> Result<Vec<VersionRecord>> {
    store.read(|tables| {
        resolve_task(tables, task, actor)?;
        Ok(())
    })?;
    ledger.history(task)
}

fn require_member(held: Role) -> Result<()> {
    if held < Role::Member {
        return Err(Denial::InsufficientRole {
            required: Role::Member,
            held,
        }
        .into());
    }
    Ok(())
}
