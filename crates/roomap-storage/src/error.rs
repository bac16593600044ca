//! Storage error types.

use std::time::Duration;

use thiserror::Error;

/// Storage-specific errors.
///
/// Errors are `Clone` so a single batch-level failure of a pipelined call
/// can be reported against every key it covered.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The key does not exist in the store.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// The store could not be reached, or the connection dropped.
    #[error("store connection error: {message}")]
    ConnectionError { message: String },

    /// A store operation did not complete within its deadline.
    #[error("store operation '{operation}' timed out after {timeout:?}")]
    QueryTimeout { operation: String, timeout: Duration },

    /// The store answered with an error or an unexpected reply.
    #[error("store query error: {message}")]
    QueryError { message: String },

    /// The liveness probe failed.
    #[error("store health check failed: {message}")]
    HealthCheckFailed { message: String },

    /// Backend configuration is unusable.
    #[error("invalid store configuration: {message}")]
    InvalidConfig { message: String },
}

impl StorageError {
    /// Returns true for "key absent", which callers treat as a normal outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::KeyNotFound { .. })
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a successful health check.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the store answered the probe.
    pub healthy: bool,
    /// Round-trip time of the probe.
    pub latency: Duration,
    /// Backend-specific detail (e.g. "redis-cluster").
    pub message: Option<String>,
}
