//! Prometheus metrics recorder and `/metrics` endpoint support.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Call once at startup, before any metrics are recorded.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Handle backed by a recorder that is not installed globally.
///
/// Renders an empty exposition; used where a server is built without
/// owning the process-wide recorder (tests, embedding).
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

// Metric name constants.

/// HTTP requests total (counter, labels: method, status).
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
/// HTTP request duration seconds (histogram, labels: method).
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
/// Todos created total (counter).
pub const TODOS_CREATED_TOTAL: &str = "todos_created_total";
/// Create requests rejected by validation (counter).
pub const TODO_VALIDATION_FAILURES_TOTAL: &str = "todo_validation_failures_total";
