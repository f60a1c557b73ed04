//! Workspace lifecycle operations.

use chrono::Utc;
use tracing::info;

use crate::security::{resolve, resolve_any, WorkspaceScope};
use crate::storage::RelationalStore;
use crate::types::{Denial, Error, Result, Role, UserId, Workspace, WorkspaceId};

/// Create a workspace. The creator receives the owner grant in the same
/// transaction as the workspace row.
pub fn create(store: &RelationalStore, actor: UserId, name: impl Into<String>) -> Result<Workspace> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(Error::invalid_input("workspace name must not be empty"));
    }

    store.transaction(|tables| {
        let workspace = Workspace::new(name.clone(), actor);
        tables.insert_workspace(workspace.clone());
        tables.put_workspace_grant(workspace.id, actor, Role::Owner);
        info!(workspace = %workspace.id, owner = %actor, "workspace created");
        Ok(workspace)
    })
}

/// Soft-delete a workspace, scheduling it for hard deletion once the
/// retention grace period elapses. Owner-only.
pub fn soft_delete(store: &RelationalStore, actor: UserId, id: WorkspaceId) -> Result<()> {
    store.transaction(|tables| {
        let resolved = resolve::<WorkspaceScope>(tables, id, actor)?;
        require_owner(resolved.role())?;
        tables.set_workspace_deleted(id, Some(Utc::now()));
        info!(workspace = %id, "workspace soft-deleted");
        Ok(())
    })
}

/// Clear the soft-delete marker on a workspace. Owner-only; reaches
/// soft-deleted rows explicitly, bypassing the default live filter.
pub fn restore(store: &RelationalStore, actor: UserId, id: WorkspaceId) -> Result<()> {
    store.transaction(|tables| {
        let resolved = resolve_any::<WorkspaceScope>(tables, id, actor)?;
        require_owner(resolved.role())?;
        tables.set_workspace_deleted(id, None);
        info!(workspace = %id, "workspace restored");
        Ok(())
    })
}

fn require_owner(held: Role) -> Result<()> {
    if held != Role::Owner {
        return Err(Denial::InsufficientRole {
            required: Role::Owner,
            held,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::resolve;

    #[test]
    fn test_creator_becomes_owner() {
        let store = RelationalStore::new();
        let actor = UserId::random();
        let workspace = create(&store, actor, "Acme").unwrap();

        store
            .read(|tables| {
                let grant = tables.workspace_grant(workspace.id, actor).unwrap();
                assert_eq!(grant.role, Role::Owner);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let store = RelationalStore::new();
        let err = create(&store, UserId::random(), "   ").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_soft_delete_hides_then_restore_recovers() {
        let store = RelationalStore::new();
        let actor = UserId::random();
        let workspace = create(&store, actor, "Acme").unwrap();

        soft_delete(&store, actor, workspace.id).unwrap();
        let err = store
            .read(|tables| resolve::<WorkspaceScope>(tables, workspace.id, actor))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        restore(&store, actor, workspace.id).unwrap();
        store
            .read(|tables| {
                resolve::<WorkspaceScope>(tables, workspace.id, actor)?;
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_soft_delete_requires_owner() {
        let store = RelationalStore::new();
        let actor = UserId::random();
        let admin = UserId::random();
        let workspace = create(&store, actor, "Acme").unwrap();
        crate::service::access::update(
            &store,
            actor,
            crate::service::access::AccessTarget::Workspace(workspace.id),
            admin,
            Some(Role::Admin),
        )
        .unwrap();

        let err = soft_delete(&store, admin, workspace.id).unwrap_err();
        assert!(matches!(
            err,
            Error::Forbidden(Denial::InsufficientRole {
                required: Role::Owner,
                held: Role::Admin
            })
        ));
    }
}
