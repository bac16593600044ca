//! roomap-api: HTTP API layer
//!
//! This crate provides the API layer including:
//! - HTTP endpoints via Axum
//! - Gzip response encoding with pooled compressors
//! - Background store health monitoring
//! - Middleware (request ids, logging, metrics)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 roomap-api                   │
//! ├─────────────────────────────────────────────┤
//! │  http/          - HTTP endpoints            │
//! │  adapters.rs    - Store -> domain reader    │
//! │  encoding.rs    - JSON + gzip bodies        │
//! │  health.rs      - Background health monitor │
//! │  middleware/    - Request ids, logs, metrics│
//! │  observability/ - Logging and Prometheus    │
//! └─────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod encoding;
pub mod health;
pub mod http;
pub mod middleware;
pub mod observability;
