//! Metrics collection for the lineage visualizer
//!
//! Prometheus counters behind a process-global registry, exposed by the
//! serving layer under `/metrics`. Counters are monotonic and atomic; they
//! carry no per-invocation transform state.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, Opts, Registry, TextEncoder};

/// Global metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Counters for the graph derivation transform
pub struct TransformMetrics {
    /// Transform invocations
    pub runs: IntCounter,
    /// Connectivity cells with unexpected values
    pub anomalous_cells: IntCounter,
    /// Rows excluded for blank feed names
    pub rows_skipped: IntCounter,
    /// Nodes materialized across all snapshots
    pub nodes_built: IntCounter,
    /// Edges derived across all snapshots
    pub edges_built: IntCounter,
}

/// Counters for the HTTP serving layer
pub struct HttpMetrics {
    /// Requests that produced a page or payload
    pub requests: IntCounter,
    /// Requests that failed with a server error
    pub failures: IntCounter,
}

/// Centralized metrics for all system components
pub struct Metrics {
    /// Graph derivation counters
    pub transform: TransformMetrics,
    /// Serving counters
    pub http: HttpMetrics,
}

fn register_counter(name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let counter = IntCounter::with_opts(Opts::new(name, help))?;
    REGISTRY.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl TransformMetrics {
    fn new() -> prometheus::Result<Self> {
        Ok(Self {
            runs: register_counter("lv_transform_runs_total", "Transform invocations")?,
            anomalous_cells: register_counter(
                "lv_transform_anomalous_cells_total",
                "Connectivity cells with unexpected values",
            )?,
            rows_skipped: register_counter(
                "lv_transform_rows_skipped_total",
                "Rows excluded for blank feed names",
            )?,
            nodes_built: register_counter(
                "lv_transform_nodes_built_total",
                "Nodes materialized across all snapshots",
            )?,
            edges_built: register_counter(
                "lv_transform_edges_built_total",
                "Edges derived across all snapshots",
            )?,
        })
    }
}

impl HttpMetrics {
    fn new() -> prometheus::Result<Self> {
        Ok(Self {
            requests: register_counter("lv_http_requests_total", "Successful requests")?,
            failures: register_counter("lv_http_failures_total", "Requests that failed")?,
        })
    }
}

impl Metrics {
    fn new() -> prometheus::Result<Self> {
        Ok(Self {
            transform: TransformMetrics::new()?,
            http: HttpMetrics::new()?,
        })
    }

    /// Get the global metrics instance
    pub fn global() -> &'static Metrics {
        static INSTANCE: Lazy<Metrics> = Lazy::new(|| {
            Metrics::new().expect("Failed to initialize metrics")
        });
        &INSTANCE
    }
}

/// Initialize the metrics registry by creating the global metrics instance
///
/// Called once during application startup so all counters are registered
/// before the first scrape.
pub fn init_registry() {
    let _ = Metrics::global();
}

/// Get the Prometheus registry for serving metrics to monitoring systems
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Collect and return all metrics as a Prometheus-formatted string
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    encoder.encode_to_string(&metric_families).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_register_and_expose() {
        init_registry();
        Metrics::global().transform.runs.inc();

        let exposition = collect_metrics();
        assert!(exposition.contains("lv_transform_runs_total"), "got: {exposition}");
        assert!(exposition.contains("lv_http_requests_total"), "got: {exposition}");
    }
}
