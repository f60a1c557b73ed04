//! Grant management entry point, dispatching by resource kind into the
//! generic mutator.

use crate::security::{update_access, PageScope, WorkspaceScope};
use crate::storage::RelationalStore;
use crate::types::{PageId, Result, Role, UserId, WorkspaceId};

/// Grant-bearing resource a caller can manage access on. Tasks are
/// absent: their access rides on the owning page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTarget {
    /// A workspace's grant table.
    Workspace(WorkspaceId),
    /// A page's grant table.
    Page(PageId),
}

/// Change or revoke `target_user`'s grant on a resource, acting as
/// `actor`. `new_role = None` revokes. All rules of the access mutator
/// apply; the whole operation commits or rolls back atomically.
pub fn update(
    store: &RelationalStore,
    actor: UserId,
    target: AccessTarget,
    target_user: UserId,
    new_role: Option<Role>,
) -> Result<()> {
    store.transaction(|tables| match target {
        AccessTarget::Workspace(id) => {
            update_access::<WorkspaceScope>(tables, id, actor, target_user, new_role)
        }
        AccessTarget::Page(id) => {
            update_access::<PageScope>(tables, id, actor, target_user, new_role)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{page, workspace};
    use crate::types::{Denial, Error, PageKind};

    #[test]
    fn test_workspace_and_page_dispatch() {
        let store = RelationalStore::new();
        let owner = UserId::random();
        let invitee = UserId::random();
        let ws = workspace::create(&store, owner, "W").unwrap();
        let page = page::create(&store, owner, ws.id, None, PageKind::Text, "P").unwrap();

        update(
            &store,
            owner,
            AccessTarget::Workspace(ws.id),
            invitee,
            Some(Role::Member),
        )
        .unwrap();
        update(
            &store,
            owner,
            AccessTarget::Page(page.id),
            invitee,
            Some(Role::Commentator),
        )
        .unwrap();

        store
            .read(|tables| {
                assert_eq!(
                    tables.workspace_grant(ws.id, invitee).unwrap().role,
                    Role::Member
                );
                assert_eq!(
                    tables.page_grant(page.id, invitee).unwrap().role,
                    Role::Commentator
                );
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_denied_operation_changes_nothing() {
        let store = RelationalStore::new();
        let owner = UserId::random();
        let member = UserId::random();
        let ws = workspace::create(&store, owner, "W").unwrap();
        update(
            &store,
            owner,
            AccessTarget::Workspace(ws.id),
            member,
            Some(Role::Member),
        )
        .unwrap();

        let err = update(
            &store,
            member,
            AccessTarget::Workspace(ws.id),
            owner,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Forbidden(Denial::CannotManageAccess { .. })
        ));

        store
            .read(|tables| {
                assert_eq!(tables.workspace_grants(ws.id).len(), 2);
                Ok(())
            })
            .unwrap();
    }
}
