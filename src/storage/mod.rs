//! Storage layer: the systems of record the core runs against.
//!
//! Two stores back the core. A relational store holds resources and
//! grants with transactional semantics, and a document store holds the
//! append-only version records. Both are the sole arbiters of durable
//! state; no in-process cache of grants or versions is authoritative.

pub mod relational;
pub mod versions;

pub use relational::{RelationalStore, Tables};
pub use versions::{MemVersionStore, VersionStore};
