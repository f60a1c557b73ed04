//! Access control: resolution, propagation, and guarded mutation of
//! grants.
//!
//! The three operations are generic over [`AccessScope`] so workspace
//! and page access share one implementation instead of a per-kind copy.

pub mod mutate;
pub mod propagate;
pub mod resolver;
pub mod scope;

pub use mutate::update_access;
pub use propagate::propagate_on_page_create;
pub use resolver::{resolve, resolve_any, resolve_task, Resolved};
pub use scope::{AccessScope, PageScope, WorkspaceScope};
