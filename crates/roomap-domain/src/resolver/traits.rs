//! Traits for store operations needed by the resolvers.

use async_trait::async_trait;

use crate::error::{DomainError, DomainResult};
use crate::records::RawFieldMap;

/// Outcome of one pipelined multi-key read.
///
/// `entries` holds one sub-result per requested key, in request order.
/// `error` carries a batch-level failure; sub-results are still inspected
/// independently when it is set.
#[derive(Debug, Clone)]
pub struct BatchRead {
    pub entries: Vec<DomainResult<Option<RawFieldMap>>>,
    pub error: Option<DomainError>,
}

impl BatchRead {
    /// A batch in which every key failed with the same error.
    pub fn failed(key_count: usize, error: DomainError) -> Self {
        Self {
            entries: (0..key_count).map(|_| Err(error.clone())).collect(),
            error: Some(error),
        }
    }
}

/// Read access to stored room maps.
#[async_trait]
pub trait RoomMapReader: Send + Sync {
    /// Reads one hotel hash. `Ok(None)` means the key does not exist.
    async fn read_hash(&self, key: &str) -> DomainResult<Option<RawFieldMap>>;

    /// Reads several hashes in one round-trip.
    ///
    /// The returned `entries` always has exactly `keys.len()` elements.
    async fn read_hashes(&self, keys: &[String]) -> BatchRead;
}
