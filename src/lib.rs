//! Hive Core - Access Control and Change Versioning
//!
//! Hive Core is the permission and history subsystem of a multi-tenant
//! workspace/page/task application: hierarchical role-based access
//! resolution, automatic grant propagation onto new resources, guarded
//! grant mutation, an append-only per-entity version ledger, and
//! real-time fan-out of recorded changes to subscribed connections.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;
pub mod types;

// Main functional modules
pub mod comms;
pub mod security;
pub mod service;
pub mod storage;
pub mod system;
pub mod version;

// Re-export commonly used items for convenience
pub use crate::core::Config;
pub use types::{Error, Result};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the core with tracing and metrics
pub fn init() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Initializing {} v{}", NAME, VERSION);

    // Initialize metrics registry
    system::metrics::init_registry();

    Ok(())
}
