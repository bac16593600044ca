//! HTTP middleware.
//!
//! Includes:
//! - Request id propagation
//! - Request logging
//! - Metrics collection

mod logging;
mod metrics;
mod request_id;

pub use logging::RequestLoggingLayer;
pub use metrics::{MetricsLayer, RequestMetrics};
pub use request_id::{RequestId, RequestIdLayer, REQUEST_ID_HEADER};
