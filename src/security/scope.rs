//! Resource-kind capability surface for the generic access components.

use std::fmt;

use crate::storage::Tables;
use crate::types::{Grant, Page, PageId, ResourceKind, Role, UserId, Workspace, WorkspaceId};

/// Capability surface a grant-bearing resource kind exposes to the
/// resolver, propagator, and mutator: load the resource, read and write
/// its grants. Tasks implement no scope; their access rides on the
/// owning page.
pub trait AccessScope {
    /// Identifier type of the resource kind.
    type Id: Copy + Eq + Ord + fmt::Display + Send + Sync + 'static;
    /// Row type of the resource kind.
    type Resource: Clone + Send + Sync;

    /// Kind tag used in errors and denial details.
    const KIND: ResourceKind;

    /// Load the resource row, including soft-deleted ones.
    fn load(tables: &Tables, id: Self::Id) -> Option<Self::Resource>;

    /// Whether the row is soft-deleted. Kinds without soft deletion
    /// report false.
    fn is_deleted(_resource: &Self::Resource) -> bool {
        false
    }

    /// The user's grant on the resource, if any.
    fn grant(tables: &Tables, id: Self::Id, user: UserId) -> Option<Grant>;

    /// All grants on the resource.
    fn grants(tables: &Tables, id: Self::Id) -> Vec<Grant>;

    /// Insert or update the user's grant.
    fn put_grant(tables: &mut Tables, id: Self::Id, user: UserId, role: Role);

    /// Remove the user's grant if present.
    fn remove_grant(tables: &mut Tables, id: Self::Id, user: UserId);
}

/// Workspace access scope.
pub struct WorkspaceScope;

impl AccessScope for WorkspaceScope {
    type Id = WorkspaceId;
    type Resource = Workspace;

    const KIND: ResourceKind = ResourceKind::Workspace;

    fn load(tables: &Tables, id: WorkspaceId) -> Option<Workspace> {
        tables.workspace(id).cloned()
    }

    fn is_deleted(resource: &Workspace) -> bool {
        resource.is_deleted()
    }

    fn grant(tables: &Tables, id: WorkspaceId, user: UserId) -> Option<Grant> {
        tables.workspace_grant(id, user).cloned()
    }

    fn grants(tables: &Tables, id: WorkspaceId) -> Vec<Grant> {
        tables.workspace_grants(id)
    }

    fn put_grant(tables: &mut Tables, id: WorkspaceId, user: UserId, role: Role) {
        tables.put_workspace_grant(id, user, role);
    }

    fn remove_grant(tables: &mut Tables, id: WorkspaceId, user: UserId) {
        tables.remove_workspace_grant(id, user);
    }
}

/// Page access scope.
pub struct PageScope;

impl AccessScope for PageScope {
    type Id = PageId;
    type Resource = Page;

    const KIND: ResourceKind = ResourceKind::Page;

    fn load(tables: &Tables, id: PageId) -> Option<Page> {
        tables.page(id).cloned()
    }

    fn grant(tables: &Tables, id: PageId, user: UserId) -> Option<Grant> {
        tables.page_grant(id, user).cloned()
    }

    fn grants(tables: &Tables, id: PageId) -> Vec<Grant> {
        tables.page_grants(id)
    }

    fn put_grant(tables: &mut Tables, id: PageId, user: UserId, role: Role) {
        tables.put_page_grant(id, user, role);
    }

    fn remove_grant(tables: &mut Tables, id: PageId, user: UserId) {
        tables.remove_page_grant(id, user);
    }
}
