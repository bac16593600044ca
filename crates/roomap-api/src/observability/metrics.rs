//! Prometheus metrics infrastructure.
//!
//! Metrics are recorded through the `metrics` facade throughout the
//! workspace and rendered here by `metrics-exporter-prometheus`.
//!
//! # Metrics Exposed
//!
//! - `roomap_http_requests_total` / `roomap_http_request_duration_seconds`
//! - `roomap_lookups_total` - Lookups by path (single, batch) and outcome
//! - `roomap_key_fallbacks_total` - Alternate-key fallbacks by path
//! - `roomap_decode_failures_total` - Stored fields that failed to decode
//! - `roomap_field_limit_exceeded_total` - Hotels truncated at the field cap
//! - `roomap_batch_identifiers_total` - Distinct identifiers resolved in batches
//! - `roomap_store_round_trip_seconds` - Store latency by operation
//! - `roomap_health_check_failures_total` - Failed background health checks

use std::sync::Arc;

use axum::{extract::State, http::header::CONTENT_TYPE, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Shared state containing the Prometheus handle for metrics rendering.
#[derive(Clone)]
pub struct MetricsState {
    handle: Arc<PrometheusHandle>,
}

impl MetricsState {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// A state backed by a recorder that is not installed globally.
    ///
    /// Renders only what is recorded through it directly, which is nothing;
    /// used where the global recorder cannot be installed, such as tests.
    pub fn detached() -> Self {
        Self::new(PrometheusBuilder::new().build_recorder().handle())
    }

    /// Renders the current metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Error type for metrics initialization.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to install Prometheus recorder: recorder already installed")]
    AlreadyInstalled,
}

/// Installs the global Prometheus recorder. Call once at startup.
pub fn init_metrics() -> Result<MetricsState, MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|_| MetricsError::AlreadyInstalled)?;

    register_default_metrics();

    Ok(MetricsState::new(handle))
}

fn register_default_metrics() {
    metrics::describe_counter!("roomap_http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "roomap_http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "roomap_lookups_total",
        "Hotel lookups by path (single, batch) and outcome (found, fallback, empty, error)"
    );
    metrics::describe_counter!(
        "roomap_key_fallbacks_total",
        "Lookups answered from the alternate key spelling"
    );
    metrics::describe_counter!(
        "roomap_decode_failures_total",
        "Stored room fields skipped because their value did not decode"
    );
    metrics::describe_counter!(
        "roomap_field_limit_exceeded_total",
        "Hotels with more raw fields than the per-hotel cap"
    );
    metrics::describe_counter!(
        "roomap_batch_identifiers_total",
        "Distinct hotel identifiers resolved through batch requests"
    );

    metrics::describe_histogram!(
        "roomap_store_round_trip_seconds",
        metrics::Unit::Seconds,
        "Store round-trip duration by operation"
    );
    metrics::describe_counter!(
        "roomap_health_check_failures_total",
        "Failed background store health checks"
    );
}

/// Prometheus exposition format content type.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Handler for the `/metrics` endpoint.
pub async fn metrics_handler(State(state): State<MetricsState>) -> impl IntoResponse {
    ([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], state.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_state_renders_without_recorder() {
        let state = MetricsState::detached();
        let cloned = state.clone();
        assert!(!cloned.render().contains("roomap_lookups_total"));
    }
}
