//! Data types for batch lookup operations.

use std::collections::BTreeMap;

use roomap_domain::RoomRecord;

/// Default cap on identifiers per batch request.
pub const MAX_BATCH_SIZE: usize = roomap_domain::resolver::DEFAULT_MAX_BATCH_SIZE;

/// Request for a batch room lookup.
#[derive(Debug, Clone)]
pub struct BatchLookupRequest {
    /// Hotel identifiers, possibly with duplicates or empty entries.
    pub hotel_ids: Vec<String>,
}

impl BatchLookupRequest {
    /// Creates a new batch lookup request.
    pub fn new<I, S>(hotel_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hotel_ids: hotel_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response from a batch lookup.
///
/// One entry per distinct non-empty identifier. Ordered by identifier so
/// that serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchLookupResponse {
    pub hotels: BTreeMap<String, Vec<RoomRecord>>,
}

/// Errors that reject a batch before any store access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchLookupError {
    /// The batch request is empty.
    #[error("hotel_ids cannot be empty")]
    EmptyBatch,

    /// The batch request exceeds the maximum allowed size.
    #[error("batch size {size} exceeds maximum allowed {max}")]
    BatchTooLarge { size: usize, max: usize },
}

/// Result type for batch lookup operations.
pub type BatchLookupResult<T> = Result<T, BatchLookupError>;
