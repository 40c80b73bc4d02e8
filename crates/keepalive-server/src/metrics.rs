//! Prometheus metrics for the keepalive server.

use keepalive::types::Summary;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Labels for cycle metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CycleLabels {
    /// Cycle outcome (success, error)
    pub outcome: String,
}

/// Labels for ping metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PingLabels {
    /// Ping status (up, down, error)
    pub status: String,
}

/// Metrics registry with all keepalive server metrics
pub struct MetricsRegistry {
    /// Prometheus registry
    pub registry: Registry,

    /// Total cycles run, by outcome
    cycles_total: Family<CycleLabels, Counter>,

    /// Total pings performed, by status
    pings_total: Family<PingLabels, Counter>,

    /// Ping duration distribution
    ping_duration_seconds: Histogram,

    /// Projects probed in the most recent cycle
    last_cycle_total: Gauge,

    /// Projects up in the most recent cycle
    last_cycle_up: Gauge,

    /// Projects down in the most recent cycle
    last_cycle_down: Gauge,
}

impl MetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let cycles_total = Family::<CycleLabels, Counter>::default();
        registry.register(
            "keepalive_cycles",
            "Total probe cycles run",
            cycles_total.clone(),
        );

        let pings_total = Family::<PingLabels, Counter>::default();
        registry.register(
            "keepalive_pings",
            "Total keep-alive pings performed",
            pings_total.clone(),
        );

        let ping_duration_seconds =
            Histogram::new(exponential_buckets(0.005, 2.0, 12));
        registry.register(
            "keepalive_ping_duration_seconds",
            "Keep-alive ping duration",
            ping_duration_seconds.clone(),
        );

        let last_cycle_total = Gauge::default();
        registry.register(
            "keepalive_last_cycle_projects",
            "Projects probed in the most recent cycle",
            last_cycle_total.clone(),
        );

        let last_cycle_up = Gauge::default();
        registry.register(
            "keepalive_last_cycle_up",
            "Projects up in the most recent cycle",
            last_cycle_up.clone(),
        );

        let last_cycle_down = Gauge::default();
        registry.register(
            "keepalive_last_cycle_down",
            "Projects down in the most recent cycle",
            last_cycle_down.clone(),
        );

        Self {
            registry,
            cycles_total,
            pings_total,
            ping_duration_seconds,
            last_cycle_total,
            last_cycle_up,
            last_cycle_down,
        }
    }

    /// Record a completed cycle and its per-ping results
    pub fn record_cycle(&self, summary: &Summary) {
        self.cycles_total
            .get_or_create(&CycleLabels {
                outcome: "success".to_string(),
            })
            .inc();

        for result in &summary.results {
            self.pings_total
                .get_or_create(&PingLabels {
                    status: result.status.to_string(),
                })
                .inc();
            self.ping_duration_seconds
                .observe(result.duration as f64 / 1000.0);
        }

        self.last_cycle_total.set(summary.total as i64);
        self.last_cycle_up.set(summary.up as i64);
        self.last_cycle_down.set(summary.down as i64);
    }

    /// Record a cycle that aborted before probing
    pub fn record_cycle_error(&self) {
        self.cycles_total
            .get_or_create(&CycleLabels {
                outcome: "error".to_string(),
            })
            .inc();
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepalive::types::PingResult;
    use prometheus_client::encoding::text::encode;

    #[test]
    fn test_record_cycle_updates_families() {
        let metrics = MetricsRegistry::new();

        let summary = Summary::from_results(vec![
            PingResult::up("a", 200, 120),
            PingResult::error("b", 40, "refused"),
        ]);
        metrics.record_cycle(&summary);
        metrics.record_cycle_error();

        let mut buffer = String::new();
        encode(&mut buffer, &metrics.registry).unwrap();

        assert!(buffer.contains("keepalive_cycles_total{outcome=\"success\"} 1"));
        assert!(buffer.contains("keepalive_cycles_total{outcome=\"error\"} 1"));
        assert!(buffer.contains("keepalive_pings_total{status=\"up\"} 1"));
        assert!(buffer.contains("keepalive_pings_total{status=\"error\"} 1"));
        assert!(buffer.contains("keepalive_last_cycle_down 1"));
    }
}
