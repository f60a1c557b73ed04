//! Application state assembly.
//!
//! Holds the components an embedding server hands to its handlers.
//! Construction follows the factory pattern: configuration in,
//! fully wired state out.

use std::sync::Arc;

use crate::comms::Broadcaster;
use crate::core::config::Config;
use crate::storage::{MemVersionStore, RelationalStore, VersionStore};
use crate::version::Ledger;

/// Central application state holding the core components.
pub struct AppState<V: VersionStore> {
    /// Relational system of record for resources and grants.
    pub store: Arc<RelationalStore>,

    /// Version ledger over the document store.
    pub ledger: Arc<Ledger<V>>,

    /// Topic fan-out hub.
    pub broadcaster: Arc<Broadcaster>,

    /// Application configuration.
    pub config: Config,
}

impl<V: VersionStore> AppState<V> {
    /// Assemble state from pre-built components.
    pub fn new(
        store: Arc<RelationalStore>,
        ledger: Arc<Ledger<V>>,
        broadcaster: Arc<Broadcaster>,
        config: Config,
    ) -> Self {
        Self {
            store,
            ledger,
            broadcaster,
            config,
        }
    }
}

impl AppState<MemVersionStore> {
    /// Build fully in-memory state from configuration. The ledger picks
    /// up the configured retry and replay bounds.
    pub fn in_memory(config: Config) -> Self {
        let ledger = Ledger::new(Arc::new(MemVersionStore::new()))
            .with_append_attempts(config.history.append_attempts)
            .with_max_replay(config.history.max_replay);
        Self {
            store: Arc::new(RelationalStore::new()),
            ledger: Arc::new(ledger),
            broadcaster: Arc::new(Broadcaster::new()),
            config,
        }
    }
}
