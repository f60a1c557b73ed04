//! Access propagation for newly created pages.
//!
//! Owners and admins of the surrounding workspace, and of the parent
//! page when one exists, receive derived admin grants on the new page
//! so organizational administrators keep visibility without self-
//! granting on every child resource. The creator stays sole owner.

use tracing::debug;

use crate::security::scope::{AccessScope, PageScope, WorkspaceScope};
use crate::storage::Tables;
use crate::types::{PageId, Role, UserId, WorkspaceId};

/// Materialize derived admin grants on `page` from the workspace's and
/// parent page's owners and admins.
///
/// Idempotent: each (page, user) pair is checked before insert, so
/// re-running cannot create duplicates, and an existing grant (the
/// creator's owner grant in particular) is never downgraded. Runs
/// inside the page-creation transaction; the page must never exist
/// without its propagated grants.
pub fn propagate_on_page_create(
    tables: &mut Tables,
    page: PageId,
    workspace: WorkspaceId,
    parent: Option<PageId>,
) {
    let mut derived = 0usize;

    let workspace_admins = managers(WorkspaceScope::grants(tables, workspace));
    derived += derive_grants(tables, page, workspace_admins);

    if let Some(parent) = parent {
        let parent_admins = managers(PageScope::grants(tables, parent));
        derived += derive_grants(tables, page, parent_admins);
    }

    if derived > 0 {
        crate::system::metrics::Metrics::global()
            .access
            .grants_propagated
            .inc_by(derived as u64);
    }
    debug!(page = %page, derived, "propagated page grants");
}

fn managers(grants: Vec<crate::types::Grant>) -> Vec<UserId> {
    grants
        .into_iter()
        .filter(|grant| grant.role.can_manage_access())
        .map(|grant| grant.user)
        .collect()
}

fn derive_grants(tables: &mut Tables, page: PageId, users: Vec<UserId>) -> usize {
    let mut inserted = 0;
    for user in users {
        if PageScope::grant(tables, page, user).is_none() {
            // Derived grants are admin, never owner.
            PageScope::put_grant(tables, page, user, Role::Admin);
            inserted += 1;
        }
    }
    inserted
}
