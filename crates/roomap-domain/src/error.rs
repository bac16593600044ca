//! Domain error types for room mapping resolution.

use thiserror::Error;

/// Domain-specific errors for room mapping resolution.
///
/// "Key absent" is not an error here: readers report it as
/// `Ok(None)` and resolvers turn it into an empty room list.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// The store could not serve the read.
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// The lookup deadline expired before the store answered.
    #[error("timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The caller supplied an identifier that cannot name a hotel.
    #[error("invalid hotel identifier: {value:?}")]
    InvalidIdentifier { value: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
