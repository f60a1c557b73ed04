//! Guarded mutation of access grants.
//!
//! No persisted state of its own: a single guarded transition over the
//! grant table, with the escalation and last-owner rules enforced
//! synchronously inside the caller's transaction.

use tracing::info;

use crate::security::scope::AccessScope;
use crate::storage::Tables;
use crate::types::{Denial, Error, Result, Role, UserId};

/// Change or revoke `target`'s grant on a resource, acting as `actor`.
///
/// `new_role = None` revokes the grant; `Some(role)` upserts it. The
/// rules, in order:
/// - the actor must hold a grant whose role can manage access;
/// - an actor demoting or removing themselves from owner is rejected
///   while no other owner exists on the resource;
/// - an admin actor may not assign admin or owner, and may not touch a
///   grant currently held at admin or owner unless it is their own.
///
/// Runs against the tables of an open transaction so the check and the
/// write commit atomically.
pub fn update_access<S: AccessScope>(
    tables: &mut Tables,
    resource: S::Id,
    actor: UserId,
    target: UserId,
    new_role: Option<Role>,
) -> Result<()> {
    let row = S::load(tables, resource).ok_or_else(|| Error::not_found(S::KIND, resource))?;
    if S::is_deleted(&row) {
        return Err(Error::not_found(S::KIND, resource));
    }

    let actor_grant = S::grant(tables, resource, actor)
        .ok_or(Denial::NoGrant { kind: S::KIND })
        .map_err(deny)?;
    if !actor_grant.role.can_manage_access() {
        return Err(deny(Denial::CannotManageAccess {
            held: actor_grant.role,
        }));
    }

    // Self-demotion from owner requires another owner to remain.
    if actor == target && actor_grant.role == Role::Owner && new_role != Some(Role::Owner) {
        let another_owner = S::grants(tables, resource)
            .iter()
            .any(|grant| grant.role == Role::Owner && grant.user != actor);
        if !another_owner {
            return Err(deny(Denial::LastOwner));
        }
    }

    if actor_grant.role == Role::Admin {
        if let Some(requested) = new_role {
            if !actor_grant.role.can_assign(requested) {
                return Err(deny(Denial::RoleAboveActor { requested }));
            }
        }
        if let Some(target_grant) = S::grant(tables, resource, target) {
            if target_grant.role.can_manage_access() && target != actor {
                return Err(deny(Denial::PeerOrSuperior {
                    held: target_grant.role,
                }));
            }
        }
    }

    match new_role {
        Some(role) => {
            S::put_grant(tables, resource, target, role);
            crate::system::metrics::Metrics::global()
                .access
                .grants_updated
                .inc();
            info!(kind = %S::KIND, resource = %resource, target = %target, role = %role, "grant updated");
        }
        None => {
            S::remove_grant(tables, resource, target);
            crate::system::metrics::Metrics::global()
                .access
                .grants_revoked
                .inc();
            info!(kind = %S::KIND, resource = %resource, target = %target, "grant revoked");
        }
    }
    Ok(())
}

fn deny(denial: Denial) -> Error {
    crate::system::metrics::Metrics::global()
        .access
        .denials
        .inc();
    Error::Forbidden(denial)
}
