//! roomap-server: Request handlers and configuration
//!
//! This crate contains the service layer between the HTTP surface and the
//! domain resolvers:
//! - Batch lookup handler with deduplication and one pipelined round-trip
//! - Configuration management
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               roomap-server                  │
//! ├─────────────────────────────────────────────┤
//! │  config.rs   - Configuration management     │
//! │  handlers/   - Request handlers             │
//! │    batch/    - Multi-hotel lookups          │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod handlers;

// Re-exports for convenience
pub use config::{ConfigLoadError, ServerConfig};
