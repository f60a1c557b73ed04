//! Roles and access grants.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Permission level a grant carries on a single resource.
///
/// Variants are declared in ascending privilege so the derived ordering
/// matches the role lattice: a role compares greater when it grants more.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only visitor.
    Guest,
    /// May comment but not change content.
    Commentator,
    /// May create and edit content.
    Member,
    /// May manage content and non-privileged access.
    Admin,
    /// Full control, including privileged access changes.
    Owner,
}

impl Role {
    /// Numeric rank of the role: owner=4, admin=3, member=2,
    /// commentator=1, guest=0.
    pub fn rank(self) -> u8 {
        match self {
            Role::Guest => 0,
            Role::Commentator => 1,
            Role::Member => 2,
            Role::Admin => 3,
            Role::Owner => 4,
        }
    }

    /// Whether the role may change other users' grants at all. True only
    /// for owner and admin.
    pub fn can_manage_access(self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    /// Whether an actor holding this role may assign `target` to someone.
    ///
    /// An admin may never hand out admin or owner; an owner may assign
    /// any role. The last-owner rule is enforced separately by the
    /// mutator, not here.
    pub fn can_assign(self, target: Role) -> bool {
        match self {
            Role::Owner => true,
            Role::Admin => target < Role::Admin,
            _ => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Guest => "guest",
            Role::Commentator => "commentator",
            Role::Member => "member",
            Role::Admin => "admin",
            Role::Owner => "owner",
        };
        write!(f, "{}", s)
    }
}

/// A (resource, user, role) record establishing a user's permission level
/// on a specific resource. Exactly one grant exists per (resource, user);
/// a user with no grant has no access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// User the grant belongs to.
    pub user: UserId,
    /// Permission level granted.
    pub role: Role,
    /// When the grant was first created. Preserved across role changes.
    pub created_at: DateTime<Utc>,
}

impl Grant {
    /// Create a grant with the current time.
    pub fn new(user: UserId, role: Role) -> Self {
        Self {
            user,
            role,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order_matches_derived_order() {
        let roles = [
            Role::Guest,
            Role::Commentator,
            Role::Member,
            Role::Admin,
            Role::Owner,
        ];
        for pair in roles.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].rank() < pair[1].rank());
        }
        assert_eq!(Role::Owner.rank(), 4);
        assert_eq!(Role::Guest.rank(), 0);
    }

    #[test]
    fn test_only_owner_and_admin_manage_access() {
        assert!(Role::Owner.can_manage_access());
        assert!(Role::Admin.can_manage_access());
        assert!(!Role::Member.can_manage_access());
        assert!(!Role::Commentator.can_manage_access());
        assert!(!Role::Guest.can_manage_access());
    }

    #[test]
    fn test_admin_cannot_assign_equals_or_superiors() {
        assert!(!Role::Admin.can_assign(Role::Admin));
        assert!(!Role::Admin.can_assign(Role::Owner));
        assert!(Role::Admin.can_assign(Role::Member));
        assert!(Role::Admin.can_assign(Role::Commentator));
        assert!(Role::Admin.can_assign(Role::Guest));
    }

    #[test]
    fn test_owner_assigns_anything() {
        for role in [
            Role::Guest,
            Role::Commentator,
            Role::Member,
            Role::Admin,
            Role::Owner,
        ] {
            assert!(Role::Owner.can_assign(role));
        }
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"owner\"");
        assert_eq!(
            serde_json::to_string(&Role::Commentator).unwrap(),
            "\"commentator\""
        );
    }
}
