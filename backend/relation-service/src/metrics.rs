//! Prometheus metrics for the relationship store and its cache

use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

static METRICS: OnceLock<RelationMetricsInner> = OnceLock::new();

struct RelationMetricsInner {
    cache_lookups: CounterVec,
    cache_writes: CounterVec,
    operations: CounterVec,
}

impl RelationMetricsInner {
    fn new() -> Self {
        Self {
            cache_lookups: CounterVec::new(
                Opts::new(
                    "relation_cache_lookups_total",
                    "Relationship cache lookups by result",
                ),
                &["result"],
            )
            .expect("valid metric definition"),
            cache_writes: CounterVec::new(
                Opts::new(
                    "relation_cache_writes_total",
                    "Relationship cache writes and invalidations by outcome",
                ),
                &["op", "outcome"],
            )
            .expect("valid metric definition"),
            operations: CounterVec::new(
                Opts::new(
                    "relation_operations_total",
                    "Relationship operations by outcome",
                ),
                &["op", "outcome"],
            )
            .expect("valid metric definition"),
        }
    }

    fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.cache_lookups.clone()))?;
        registry.register(Box::new(self.cache_writes.clone()))?;
        registry.register(Box::new(self.operations.clone()))?;
        Ok(())
    }
}

fn get_metrics() -> &'static RelationMetricsInner {
    METRICS.get_or_init(RelationMetricsInner::new)
}

/// Register metrics with a Prometheus registry
pub fn register(registry: &Registry) -> Result<(), prometheus::Error> {
    get_metrics().register(registry)
}

/// Render a registry in the Prometheus text exposition format
pub fn render(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

pub fn record_cache_hit() {
    get_metrics().cache_lookups.with_label_values(&["hit"]).inc();
}

pub fn record_cache_miss() {
    get_metrics().cache_lookups.with_label_values(&["miss"]).inc();
}

pub fn record_cache_error() {
    get_metrics().cache_lookups.with_label_values(&["error"]).inc();
}

/// `op` is `set` or `invalidate`
pub fn record_cache_write(op: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    get_metrics()
        .cache_writes
        .with_label_values(&[op, outcome])
        .inc();
}

pub fn record_operation(op: &str, outcome: &str) {
    get_metrics()
        .operations
        .with_label_values(&[op, outcome])
        .inc();
}
