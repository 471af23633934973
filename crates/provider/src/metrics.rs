use ccv_config::MetricsConfig;
use ccv_metrics::{Counter, Gauge, SharedRegistry};

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    /// Number of validator set change packets handed to the transport
    pub vsc_packets_sent: Counter,

    /// Number of slash packets that resulted in a slash
    pub slash_packets_applied: Counter,

    /// Number of slash packets for unknown, unbonded or tombstoned validators
    pub slash_packets_ignored: Counter,

    /// Number of slash packets answered with an error acknowledgement
    pub slash_packets_rejected: Counter,

    /// Number of maturity notices received
    pub vsc_matured_received: Counter,

    /// Number of consumer channels closed on a fault
    pub channels_closed: Counter,

    /// Number of unbonding operations currently on hold
    pub unbonding_ops_on_hold: Gauge,

    /// Identifier of the validator set change being computed
    pub valset_update_id: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics registered in the global registry when enabled, detached otherwise.
    pub fn from_config(config: &MetricsConfig) -> Self {
        if config.enabled {
            Self::register(SharedRegistry::global())
        } else {
            Self::new()
        }
    }

    pub fn register(registry: &SharedRegistry) -> Self {
        let metrics = Self::new();

        registry.with_prefix("ccv_provider", |registry| {
            registry.register(
                "vsc_packets_sent",
                "Number of validator set change packets sent to consumer chains",
                metrics.vsc_packets_sent.clone(),
            );

            registry.register(
                "slash_packets_applied",
                "Number of slash packets that resulted in a slash",
                metrics.slash_packets_applied.clone(),
            );

            registry.register(
                "slash_packets_ignored",
                "Number of slash packets for unknown, unbonded or tombstoned validators",
                metrics.slash_packets_ignored.clone(),
            );

            registry.register(
                "slash_packets_rejected",
                "Number of slash packets answered with an error acknowledgement",
                metrics.slash_packets_rejected.clone(),
            );

            registry.register(
                "vsc_matured_received",
                "Number of maturity notices received from consumer chains",
                metrics.vsc_matured_received.clone(),
            );

            registry.register(
                "channels_closed",
                "Number of consumer channels closed on a fault",
                metrics.channels_closed.clone(),
            );

            registry.register(
                "unbonding_ops_on_hold",
                "Number of unbonding operations waiting on consumer chains",
                metrics.unbonding_ops_on_hold.clone(),
            );

            registry.register(
                "valset_update_id",
                "Identifier of the validator set change being computed",
                metrics.valset_update_id.clone(),
            );
        });

        metrics
    }
}
