//! Adapters that bridge the storage layer to the domain layer.
//!
//! The domain layer (roomap-domain) reads room maps through `RoomMapReader`
//! and knows nothing about Redis. The storage layer (roomap-storage)
//! implements `RoomStore` with concrete backends. This module connects the
//! two and translates storage errors into domain terms:
//!
//! - `KeyNotFound` becomes `Ok(None)`, the normal "absent" signal
//! - `QueryTimeout` becomes `DomainError::Timeout`
//! - anything else becomes `DomainError::StoreUnavailable`

use std::sync::Arc;

use async_trait::async_trait;

use roomap_domain::{BatchRead, DomainError, DomainResult, RawFieldMap, RoomMapReader};
use roomap_storage::{RoomStore, StorageError, StorageResult};

/// Adapter that implements `RoomMapReader` using a `RoomStore`.
pub struct StoreRoomMapReader<S: RoomStore> {
    store: Arc<S>,
}

impl<S: RoomStore> StoreRoomMapReader<S> {
    /// Creates a new adapter wrapping the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn to_domain_error(err: StorageError) -> DomainError {
    match err {
        StorageError::QueryTimeout { timeout, .. } => DomainError::Timeout {
            duration_ms: timeout.as_millis() as u64,
        },
        other => DomainError::StoreUnavailable {
            message: other.to_string(),
        },
    }
}

fn to_domain_entry(result: StorageResult<RawFieldMap>) -> DomainResult<Option<RawFieldMap>> {
    match result {
        Ok(fields) => Ok(Some(fields)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(to_domain_error(e)),
    }
}

#[async_trait]
impl<S: RoomStore> RoomMapReader for StoreRoomMapReader<S> {
    async fn read_hash(&self, key: &str) -> DomainResult<Option<RawFieldMap>> {
        to_domain_entry(self.store.hash_get_all(key).await)
    }

    async fn read_hashes(&self, keys: &[String]) -> BatchRead {
        let response = self.store.pipelined_hash_get_all(keys).await;
        BatchRead {
            entries: response.results.into_iter().map(to_domain_entry).collect(),
            error: response.batch_error.map(to_domain_error),
        }
    }
}
