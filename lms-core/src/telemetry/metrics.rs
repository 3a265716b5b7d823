//! Prometheus recorder and metric descriptions

use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Latency buckets in seconds
const BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Install the global Prometheus recorder
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets(BUCKETS)?
        .install_recorder()
}

/// Register HELP/TYPE lines so they appear before the first request
pub fn describe_metrics() {
    describe_counter!("lms_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "lms_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "lms_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );
    describe_gauge!(
        "lms_db_pool_connections",
        "Open connections in the database pool"
    );
    describe_gauge!(
        "lms_db_pool_connections_idle",
        "Idle connections in the database pool"
    );

    gauge!("lms_http_requests_in_flight").set(0.0);
}
