//! Page creation and structure rules.

use tracing::info;

use crate::security::{propagate_on_page_create, resolve, PageScope, WorkspaceScope};
use crate::storage::RelationalStore;
use crate::types::{
    Denial, Error, Page, PageId, PageKind, ResourceKind, Result, Role, UserId, WorkspaceId,
};

/// Create a page, either directly under a workspace or nested below a
/// parent page.
///
/// The creator needs member or better on the parent page when one is
/// given, otherwise on the workspace, and becomes sole owner of the new
/// page. Derived admin grants for the workspace's and parent's owners
/// and admins are materialized in the same transaction, so a page never
/// exists without them.
pub fn create(
    store: &RelationalStore,
    actor: UserId,
    workspace: WorkspaceId,
    parent: Option<PageId>,
    kind: PageKind,
    title: impl Into<String>,
) -> Result<Page> {
    let title = title.into();
    if title.trim().is_empty() {
        return Err(Error::invalid_input("page title must not be empty"));
    }

    store.transaction(|tables| {
        // The workspace must exist and be live even when access is
        // checked against the parent page.
        let workspace_row = tables
            .workspace(workspace)
            .ok_or_else(|| Error::not_found(ResourceKind::Workspace, workspace))?;
        if workspace_row.is_deleted() {
            return Err(Error::not_found(ResourceKind::Workspace, workspace));
        }

        match parent {
            Some(parent_id) => {
                let parent_page = resolve::<PageScope>(tables, parent_id, actor)?;
                require_member(parent_page.role())?;
                if parent_page.resource.workspace != workspace {
                    return Err(Error::invalid_input(
                        "parent page belongs to a different workspace",
                    ));
                }
                // Groups are exactly one level deep.
                if kind == PageKind::Group {
                    return Err(Error::invalid_input("a group page cannot have a parent"));
                }
            }
            None => {
                let resolved = resolve::<WorkspaceScope>(tables, workspace, actor)?;
                require_member(resolved.role())?;
            }
        }

        let page = Page::new(workspace, parent, kind, title.clone());
        tables.insert_page(page.clone());
        tables.put_page_grant(page.id, actor, Role::Owner);
        propagate_on_page_create(tables, page.id, workspace, parent);
        info!(page = %page.id, workspace = %workspace, owner = %actor, "page created");
        Ok(page)
    })
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
