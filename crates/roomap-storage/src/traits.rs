//! RoomStore trait definition.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{HealthStatus, StorageError, StorageResult};

/// A hotel's stored hash: raw room name to JSON-encoded value blob.
pub type RawFieldMap = HashMap<String, String>;

/// Result of a pipelined multi-key hash read.
#[derive(Debug, Default)]
pub struct PipelineResponse {
    /// One entry per requested key, in request order.
    pub results: Vec<StorageResult<RawFieldMap>>,
    /// Set when the pipeline as a whole failed. Per-key entries are still
    /// present (typically carrying the same error).
    pub batch_error: Option<StorageError>,
}

impl PipelineResponse {
    /// Builds a response where every key failed with the same batch error.
    pub fn failed(key_count: usize, error: StorageError) -> Self {
        Self {
            results: vec![Err(error.clone()); key_count],
            batch_error: Some(error),
        }
    }
}

/// Read-only capability interface onto the key-value store.
///
/// Implementations must be thread-safe (Send + Sync) and cheap to share
/// behind an `Arc` for the lifetime of the process.
#[async_trait]
pub trait RoomStore: Send + Sync + 'static {
    /// Reads every field of the hash at `key`.
    ///
    /// Fails with `StorageError::KeyNotFound` when the key does not exist.
    async fn hash_get_all(&self, key: &str) -> StorageResult<RawFieldMap>;

    /// Reads several hashes in a single round-trip.
    async fn pipelined_hash_get_all(&self, keys: &[String]) -> PipelineResponse;

    /// Liveness probe.
    async fn health_check(&self) -> StorageResult<HealthStatus>;

    /// Short backend name for logs and metric labels.
    fn backend_name(&self) -> &'static str;
}
