//! Error types and handling for the access-control and versioning core.
//!
//! The taxonomy is deliberately small: callers surface these directly to
//! the client as a stable code plus structured details, with no retry.

use thiserror::Error;

use crate::types::grant::Role;
use crate::types::ResourceKind;

/// Main result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The resource does not exist, or is soft-deleted and the caller did
    /// not ask for soft-deleted rows.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of the missing resource.
        kind: ResourceKind,
        /// Identifier the caller asked for.
        id: String,
    },

    /// The caller holds no grant or an insufficient one.
    #[error("forbidden: {0}")]
    Forbidden(#[from] Denial),

    /// A concurrent writer claimed the same version number.
    #[error("version conflict on {entity}: version {version} already recorded")]
    Conflict {
        /// Entity whose ledger collided.
        entity: String,
        /// The version number both writers attempted.
        version: u64,
    },

    /// The request shape or arguments are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Storage fault or unexpected state.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Structured reason for an access denial, returned to clients so they
/// can render a precise message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The user holds no grant on the resource.
    #[error("no grant on {kind}")]
    NoGrant {
        /// Kind of the resource the grant was missing on.
        kind: ResourceKind,
    },

    /// The actor's role cannot manage access at all.
    #[error("role {held} cannot manage access")]
    CannotManageAccess {
        /// Role the actor holds.
        held: Role,
    },

    /// The actor's role is below what the operation requires.
    #[error("role {held} is below the required {required}")]
    InsufficientRole {
        /// Minimum role the operation requires.
        required: Role,
        /// Role the actor holds.
        held: Role,
    },

    /// An admin attempted to assign a role at or above their own.
    #[error("an admin cannot assign {requested}")]
    RoleAboveActor {
        /// Role the actor requested for the target.
        requested: Role,
    },

    /// An admin attempted to touch a grant held by a peer or superior.
    #[error("an admin cannot modify a grant held at {held}")]
    PeerOrSuperior {
        /// Role the target currently holds.
        held: Role,
    },

    /// The operation would leave the resource without any owner.
    #[error("a resource must retain at least one owner")]
    LastOwner,
}

impl Error {
    /// Create a not-found error for a resource id.
    pub fn not_found(kind: ResourceKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Forbidden(_) => "forbidden",
            Error::Conflict { .. } => "conflict",
            Error::InvalidInput(_) => "invalid_input",
            Error::Internal(_) => "internal",
        }
    }

    /// Check if this is a client error (4xx equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::Forbidden(_)
                | Error::Conflict { .. }
                | Error::InvalidInput(_)
        )
    }

    /// Check if this is a server error (5xx equivalent).
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = Error::not_found(ResourceKind::Page, "p1");
        assert_eq!(err.code(), "not_found");

        let err = Error::from(Denial::LastOwner);
        assert_eq!(err.code(), "forbidden");

        let err = Error::Conflict {
            entity: "t1".to_string(),
            version: 4,
        };
        assert_eq!(err.code(), "conflict");

        assert_eq!(Error::invalid_input("x").code(), "invalid_input");
        assert_eq!(Error::internal("x").code(), "internal");
    }

    #[test]
    fn test_client_server_classification() {
        assert!(Error::from(Denial::LastOwner).is_client_error());
        assert!(!Error::from(Denial::LastOwner).is_server_error());
        assert!(Error::internal("boom").is_server_error());
        assert!(!Error::internal("boom").is_client_error());
    }

    #[test]
    fn test_denial_messages_name_the_rule() {
        let msg = Denial::CannotManageAccess { held: Role::Member }.to_string();
        assert!(msg.contains("member"));

        let msg = Denial::RoleAboveActor {
            requested: Role::Owner,
        }
        .to_string();
        assert!(msg.contains("owner"));
    }
}
