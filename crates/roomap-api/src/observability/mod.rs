//! Observability infrastructure.
//!
//! This module provides:
//! - Structured logging configuration
//! - Prometheus metrics recorder and endpoint

mod logging;
mod metrics;

pub use logging::{create_json_layer, init_logging, parse_log_level, LoggingConfig};
pub use metrics::{init_metrics, metrics_handler, MetricsError, MetricsState};
