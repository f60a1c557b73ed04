//! Access resolution: load a resource together with the caller's grant.

use crate::security::scope::AccessScope;
use crate::storage::Tables;
use crate::types::{Denial, Error, Grant, Result, ResourceKind, Role, Task, TaskId, UserId};

/// A resource loaded together with the caller's grant on it.
pub struct Resolved<S: AccessScope> {
    /// The resource row.
    pub resource: S::Resource,
    /// The caller's grant.
    pub grant: Grant,
}

impl<S: AccessScope> Resolved<S> {
    /// The caller's effective role on the resource.
    pub fn role(&self) -> Role {
        self.grant.role
    }
}

/// Load a live resource and the caller's grant on it.
///
/// Fails with `NotFound` when the row is absent or soft-deleted, and
/// with `Forbidden` when the row exists but the caller holds no grant.
pub fn resolve<S: AccessScope>(tables: &Tables, id: S::Id, user: UserId) -> Result<Resolved<S>> {
    let resource = S::load(tables, id).ok_or_else(|| Error::not_found(S::KIND, id))?;
    if S::is_deleted(&resource) {
        return Err(Error::not_found(S::KIND, id));
    }
    grant_on(tables, &resource, id, user)
}

/// Like [`resolve`], but returns soft-deleted rows too. For callers
/// that explicitly need them, such as workspace restore.
pub fn resolve_any<S: AccessScope>(
    tables: &Tables,
    id: S::Id,
    user: UserId,
) -> Result<Resolved<S>> {
    let resource = S::load(tables, id).ok_or_else(|| Error::not_found(S::KIND, id))?;
    grant_on(tables, &resource, id, user)
}

fn grant_on<S: AccessScope>(
    tables: &Tables,
    resource: &S::Resource,
    id: S::Id,
    user: UserId,
) -> Result<Resolved<S>> {
    match S::grant(tables, id, user) {
        Some(grant) => Ok(Resolved {
            resource: resource.clone(),
            grant,
        }),
        None => {
            crate::system::metrics::Metrics::global()
                .access
                .denials
                .inc();
            Err(Denial::NoGrant { kind: S::KIND }.into())
        }
    }
}

/// Resolve a task through its owning page's grant. Tasks carry no
/// grants of their own.
pub fn resolve_task(tables: &Tables, id: TaskId, user: UserId) -> Result<(Task, Grant)> {
    let task = tables
        .task(id)
        .cloned()
        .ok_or_else(|| Error::not_found(ResourceKind::Task, id))?;
    // A task pointing at a missing page is corrupt state, not a normal
    // not-found.
    if tables.page(task.page).is_none() {
        return Err(Error::internal(format!(
            "task {} references missing page {}",
            task.id, task.page
        )));
    }
    let grant = match tables.page_grant(task.page, user) {
        Some(grant) => grant.clone(),
        None => {
            crate::system::metrics::Metrics::global()
                .access
                .denials
                .inc();
            return Err(Denial::NoGrant {
                kind: ResourceKind::Page,
            }
            .into());
        }
    };
    Ok((task, grant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::scope::{PageScope, WorkspaceScope};
    use crate::types::{Page, PageKind, Workspace};
    use chrono::Utc;

    fn seeded_tables() -> (Tables, Workspace, UserId, UserId) {
        let owner = UserId::random();
        let stranger = UserId::random();
        let workspace = Workspace::new("W", owner);
        let mut tables = Tables::default();
        tables.insert_workspace(workspace.clone());
        tables.put_workspace_grant(workspace.id, owner, Role::Owner);
        (tables, workspace, owner, stranger)
    }

    #[test]
    fn test_resolve_returns_resource_and_grant() {
        let (tables, workspace, owner, _) = seeded_tables();
        let resolved = resolve::<WorkspaceScope>(&tables, workspace.id, owner).unwrap();
        assert_eq!(resolved.resource.id, workspace.id);
        assert_eq!(resolved.role(), Role::Owner);
    }

    #[test]
    fn test_missing_resource_is_not_found() {
        let (tables, _, owner, _) = seeded_tables();
        let err = resolve::<WorkspaceScope>(&tables, crate::types::WorkspaceId::random(), owner)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_missing_grant_is_forbidden() {
        let (tables, workspace, _, stranger) = seeded_tables();
        let err = resolve::<WorkspaceScope>(&tables, workspace.id, stranger).unwrap_err();
        assert!(matches!(
            err,
            Error::Forbidden(Denial::NoGrant {
                kind: ResourceKind::Workspace
            })
        ));
    }

    #[test]
    fn test_soft_deleted_hidden_by_default_visible_to_resolve_any() {
        let (mut tables, workspace, owner, _) = seeded_tables();
        tables.set_workspace_deleted(workspace.id, Some(Utc::now()));

        let err = resolve::<WorkspaceScope>(&tables, workspace.id, owner).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let resolved = resolve_any::<WorkspaceScope>(&tables, workspace.id, owner).unwrap();
        assert!(resolved.resource.is_deleted());
    }

    #[test]
    fn test_task_resolves_through_owning_page() {
        let (mut tables, workspace, owner, stranger) = seeded_tables();
        let page = Page::new(workspace.id, None, PageKind::Board, "P");
        tables.insert_page(page.clone());
        tables.put_page_grant(page.id, owner, Role::Owner);
        let task = Task::new(page.id, "T", owner, None);
        tables.put_task(task.clone());

        let (loaded, grant) = resolve_task(&tables, task.id, owner).unwrap();
        assert_eq!(loaded.id, task.id);
        assert_eq!(grant.role, Role::Owner);

        let err = resolve_task(&tables, task.id, stranger).unwrap_err();
        assert!(matches!(
            err,
            Error::Forbidden(Denial::NoGrant {
                kind: ResourceKind::Page
            })
        ));
    }

    #[test]
    fn test_task_with_missing_page_is_internal() {
        let (mut tables, _, owner, _) = seeded_tables();
        let task = Task::new(crate::types::PageId::random(), "T", owner, None);
        tables.put_task(task.clone());

        let err = resolve_task(&tables, task.id, owner).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_page_resolution_uses_same_path_as_workspace() {
        let (mut tables, workspace, owner, stranger) = seeded_tables();
        let page = Page::new(workspace.id, None, PageKind::Text, "P");
        tables.insert_page(page.clone());
        tables.put_page_grant(page.id, stranger, Role::Commentator);

        let resolved = resolve::<PageScope>(&tables, page.id, stranger).unwrap();
        assert_eq!(resolved.role(), Role::Commentator);

        let err = resolve::<PageScope>(&tables, page.id, owner).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }
}
