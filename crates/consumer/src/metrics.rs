use ccv_config::MetricsConfig;
use ccv_metrics::{Counter, Gauge, SharedRegistry};

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    /// Number of slash packets queued
    pub slash_packets_queued: Counter,

    /// Number of downtime reports dropped while one was in flight for the same validator
    pub downtime_requests_dropped: Counter,

    /// Number of maturity notices queued
    pub vsc_matured_queued: Counter,

    /// Number of packets handed to the transport
    pub packets_sent: Counter,

    /// Number of validator set change packets received
    pub vsc_packets_received: Counter,

    /// Number of packets waiting to be sent
    pub pending_packets: Gauge,
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

        registry.with_prefix("ccv_consumer", |registry| {
            registry.register(
                "slash_packets_queued",
                "Number of slash packets queued for the provider",
                metrics.slash_packets_queued.clone(),
            );

            registry.register(
                "downtime_requests_dropped",
                "Number of downtime reports dropped while one was in flight",
                metrics.downtime_requests_dropped.clone(),
            );

            registry.register(
                "vsc_matured_queued",
                "Number of maturity notices queued for the provider",
                metrics.vsc_matured_queued.clone(),
            );

            registry.register(
                "packets_sent",
                "Number of packets sent to the provider",
                metrics.packets_sent.clone(),
            );

            registry.register(
                "vsc_packets_received",
                "Number of validator set change packets received",
                metrics.vsc_packets_received.clone(),
            );

            registry.register(
                "pending_packets",
                "Number of packets waiting to be sent",
                metrics.pending_packets.clone(),
            );
        });

        metrics
    }
}
