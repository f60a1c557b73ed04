//! In-memory relational store with transactional semantics.
//!
//! Stands in for the external relational driver the application deploys
//! against. Rows live in ordered maps keyed by id; grant tables are
//! keyed by (resource, user) so uniqueness of the pair falls out of the
//! key. `transaction` stages a copy of the tables and swaps it in on
//! success, so an `Err` from the closure rolls every staged write back
//! and concurrent mutators never observe partial state.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::info;

use crate::types::{
    Grant, Page, PageId, Result, Role, Task, TaskId, UserId, Workspace, WorkspaceId,
};

/// The full relational table set. Access components operate on this
/// type inside `read`/`transaction` closures.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub(crate) workspaces: BTreeMap<WorkspaceId, Workspace>,
    pub(crate) pages: BTreeMap<PageId, Page>,
    pub(crate) tasks: BTreeMap<TaskId, Task>,
    pub(crate) workspace_grants: BTreeMap<(WorkspaceId, UserId), Grant>,
    pub(crate) page_grants: BTreeMap<(PageId, UserId), Grant>,
}

impl Tables {
    /// Look up a workspace row, including soft-deleted ones. Callers
    /// wanting the default live-only view go through the resolver.
    pub fn workspace(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(&id)
    }

    /// Look up a page row.
    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(&id)
    }

    /// Look up a task row.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Insert a workspace row.
    pub fn insert_workspace(&mut self, workspace: Workspace) {
        self.workspaces.insert(workspace.id, workspace);
    }

    /// Insert a page row.
    pub fn insert_page(&mut self, page: Page) {
        self.pages.insert(page.id, page);
    }

    /// Insert or replace a task row.
    pub fn put_task(&mut self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    /// Stamp or clear the soft-delete marker on a workspace.
    pub fn set_workspace_deleted(&mut self, id: WorkspaceId, deleted_at: Option<DateTime<Utc>>) {
        if let Some(workspace) = self.workspaces.get_mut(&id) {
            workspace.deleted_at = deleted_at;
        }
    }

    /// One workspace grant, if present.
    pub fn workspace_grant(&self, id: WorkspaceId, user: UserId) -> Option<&Grant> {
        self.workspace_grants.get(&(id, user))
    }

    /// All grants on a workspace.
    pub fn workspace_grants(&self, id: WorkspaceId) -> Vec<Grant> {
        self.workspace_grants
            .range((id, UserId::from(uuid::Uuid::nil()))..)
            .take_while(|((ws, _), _)| *ws == id)
            .map(|(_, grant)| grant.clone())
            .collect()
    }

    /// Upsert a workspace grant. A role change keeps the original
    /// creation time.
    pub fn put_workspace_grant(&mut self, id: WorkspaceId, user: UserId, role: Role) {
        self.workspace_grants
            .entry((id, user))
            .and_modify(|grant| grant.role = role)
            .or_insert_with(|| Grant::new(user, role));
    }

    /// Delete a workspace grant if present.
    pub fn remove_workspace_grant(&mut self, id: WorkspaceId, user: UserId) {
        self.workspace_grants.remove(&(id, user));
    }

    /// One page grant, if present.
    pub fn page_grant(&self, id: PageId, user: UserId) -> Option<&Grant> {
        self.page_grants.get(&(id, user))
    }

    /// All grants on a page.
    pub fn page_grants(&self, id: PageId) -> Vec<Grant> {
        self.page_grants
            .range((id, UserId::from(uuid::Uuid::nil()))..)
            .take_while(|((page, _), _)| *page == id)
            .map(|(_, grant)| grant.clone())
            .collect()
    }

    /// Upsert a page grant. A role change keeps the original creation
    /// time.
    pub fn put_page_grant(&mut self, id: PageId, user: UserId, role: Role) {
        self.page_grants
            .entry((id, user))
            .and_modify(|grant| grant.role = role)
            .or_insert_with(|| Grant::new(user, role));
    }

    /// Delete a page grant if present.
    pub fn remove_page_grant(&mut self, id: PageId, user: UserId) {
        self.page_grants.remove(&(id, user));
    }

    fn remove_workspace_cascade(&mut self, id: WorkspaceId) {
        let page_ids: Vec<PageId> = self
            .pages
            .values()
            .filter(|page| page.workspace == id)
            .map(|page| page.id)
            .collect();
        for page_id in &page_ids {
            self.tasks.retain(|_, task| task.page != *page_id);
            self.page_grants.retain(|(page, _), _| page != page_id);
            self.pages.remove(page_id);
        }
        self.workspace_grants.retain(|(ws, _), _| *ws != id);
        self.workspaces.remove(&id);
    }
}

/// Relational store guarding the table set behind a reader-writer lock.
///
/// Reads run concurrently; transactions serialize on the write lock so
/// no other mutator on the same tables can interleave partial state.
#[derive(Debug, Default)]
pub struct RelationalStore {
    tables: RwLock<Tables>,
}

impl RelationalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-only closure over the tables.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> Result<R>) -> Result<R> {
        let tables = self.tables.read();
        f(&tables)
    }

    /// Run a closure transactionally. Writes are staged on a copy of
    /// the tables and swapped in only when the closure returns `Ok`;
    /// any `Err` (including a cancelled caller propagating one) leaves
    /// the store untouched.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut Tables) -> Result<R>) -> Result<R> {
        let mut tables = self.tables.write();
        let mut staged = tables.clone();
        match f(&mut staged) {
            Ok(value) => {
                *tables = staged;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }

    /// Hard-delete workspaces whose soft-delete marker has aged past
    /// the retention grace period, cascading to their pages, tasks, and
    /// grants. Returns how many workspaces were purged.
    pub fn purge_due(&self, now: DateTime<Utc>, grace: Duration) -> Result<usize> {
        self.transaction(|tables| {
            let due: Vec<WorkspaceId> = tables
                .workspaces
                .values()
                .filter(|ws| matches!(ws.deleted_at, Some(at) if at + grace <= now))
                .map(|ws| ws.id)
                .collect();
            for id in &due {
                tables.remove_workspace_cascade(*id);
                info!(workspace = %id, "purged expired workspace");
            }
            Ok(due.len())
        })
    }
}
