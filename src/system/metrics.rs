//! Metrics collection for the access-control and versioning core.
//!
//! Prometheus counters and gauges registered once in the default
//! registry, grouped per component.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_gauge, IntCounter, IntGauge,
};

/// Access-control metrics.
pub struct AccessMetrics {
    /// Total derived grants materialized by propagation.
    pub grants_propagated: IntCounter,
    /// Total grants created or role-changed through the mutator.
    pub grants_updated: IntCounter,
    /// Total grants revoked through the mutator.
    pub grants_revoked: IntCounter,
    /// Total access denials across resolver and mutator.
    pub denials: IntCounter,
}

/// Version ledger metrics.
pub struct VersionMetrics {
    /// Total version records appended.
    pub records_appended: IntCounter,
    /// Total version-number collisions observed before retry.
    pub collisions: IntCounter,
    /// Total history replays served.
    pub history_replays: IntCounter,
}

/// Broadcast metrics.
pub struct BroadcastMetrics {
    /// Total messages delivered to subscribers.
    pub delivered: IntCounter,
    /// Total messages dropped on dead or saturated peers.
    pub dropped: IntCounter,
    /// Current number of (topic, connection) subscriptions.
    pub subscriptions: IntGauge,
}

/// Centralized metrics for all core components.
pub struct Metrics {
    /// Access-control metrics.
    pub access: AccessMetrics,
    /// Version ledger metrics.
    pub versions: VersionMetrics,
    /// Broadcast metrics.
    pub broadcast: BroadcastMetrics,
}

impl Metrics {
    fn new() -> prometheus::Result<Self> {
        Ok(Self {
            access: AccessMetrics {
                grants_propagated: register_int_counter!(
                    "hive_grants_propagated_total",
                    "Total derived grants materialized by propagation"
                )?,
                grants_updated: register_int_counter!(
                    "hive_grants_updated_total",
                    "Total grants created or role-changed"
                )?,
                grants_revoked: register_int_counter!(
                    "hive_grants_revoked_total",
                    "Total grants revoked"
                )?,
                denials: register_int_counter!(
                    "hive_access_denials_total",
                    "Total access denials"
                )?,
            },
            versions: VersionMetrics {
                records_appended: register_int_counter!(
                    "hive_versions_recorded_total",
                    "Total version records appended"
                )?,
                collisions: register_int_counter!(
                    "hive_version_collisions_total",
                    "Total version-number collisions before retry"
                )?,
                history_replays: register_int_counter!(
                    "hive_history_replays_total",
                    "Total history replays served"
                )?,
            },
            broadcast: BroadcastMetrics {
                delivered: register_int_counter!(
                    "hive_broadcast_delivered_total",
                    "Total messages delivered to subscribers"
                )?,
                dropped: register_int_counter!(
                    "hive_broadcast_dropped_total",
                    "Total messages dropped on dead or saturated peers"
                )?,
                subscriptions: register_int_gauge!(
                    "hive_broadcast_subscriptions",
                    "Current number of topic subscriptions"
                )?,
            },
        })
    }

    /// Get the global metrics instance.
    pub fn global() -> &'static Metrics {
        static INSTANCE: Lazy<Metrics> = Lazy::new(|| {
            Metrics::new().expect("Failed to initialize metrics")
        });
        &INSTANCE
    }
}

/// Force registration of all metrics in the default registry.
pub fn init_registry() {
    let _ = Metrics::global();
}

/// Gather all registered metric families for exposition.
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    prometheus::gather()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_once_and_count() {
        init_registry();
        let metrics = Metrics::global();

        let before = metrics.versions.records_appended.get();
        metrics.versions.records_appended.inc();
        assert_eq!(metrics.versions.records_appended.get(), before + 1);

        metrics.broadcast.subscriptions.inc();
        metrics.broadcast.subscriptions.dec();
    }

    #[test]
    fn test_gather_exposes_core_families() {
        init_registry();
        let families = gather();
        let names: Vec<&str> = families.iter().map(|family| family.get_name()).collect();
        assert!(names.contains(&"hive_versions_recorded_total"));
        assert!(names.contains(&"hive_broadcast_delivered_total"));
    }
}
