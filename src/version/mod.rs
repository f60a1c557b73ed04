//! Change versioning: the append-only per-entity ledger and the field
//! diffing that feeds it.

pub mod diff;
pub mod ledger;

pub use diff::task_changes;
pub use ledger::Ledger;
