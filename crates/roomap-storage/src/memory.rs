//! In-memory storage implementation for testing and local development.
//!
//! Unlike Redis, this backend can hold an *empty* hash, which lets tests
//! exercise the "key exists but has no fields" path separately from
//! "key absent".

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::instrument;

use crate::error::{HealthStatus, StorageError, StorageResult};
use crate::traits::{PipelineResponse, RawFieldMap, RoomStore};

/// In-memory implementation of RoomStore.
///
/// Besides holding data, it records how many round-trips were issued and
/// supports fault injection (whole-store outage, per-key failures and
/// artificial latency) so callers' degradation paths can be tested.
#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    hashes: DashMap<String, RawFieldMap>,
    /// Keys whose reads fail with a query error.
    failing_keys: DashMap<String, ()>,
    /// When set, every operation fails with a connection error.
    unavailable: AtomicBool,
    /// Artificial delay applied to every round-trip, in milliseconds.
    latency_ms: AtomicU64,
    single_reads: AtomicU64,
    pipelined_reads: AtomicU64,
}

impl MemoryRoomStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Replaces the hash stored at `key`.
    pub fn insert_hash<I, K, V>(&self, key: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.hashes.insert(key.into(), map);
    }

    /// Makes reads of `key` fail with a query error.
    pub fn fail_key(&self, key: impl Into<String>) {
        self.failing_keys.insert(key.into(), ());
    }

    /// Simulates a full store outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays every round-trip by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of single-key `hash_get_all` round-trips served.
    pub fn single_read_count(&self) -> u64 {
        self.single_reads.load(Ordering::SeqCst)
    }

    /// Number of pipelined round-trips served.
    pub fn pipelined_read_count(&self) -> u64 {
        self.pipelined_reads.load(Ordering::SeqCst)
    }

    async fn simulate_round_trip(&self) -> StorageResult<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::ConnectionError {
                message: "in-memory store marked unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn read_one(&self, key: &str) -> StorageResult<RawFieldMap> {
        if self.failing_keys.contains_key(key) {
            return Err(StorageError::QueryError {
                message: format!("injected failure for key {key}"),
            });
        }
        self.hashes
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::KeyNotFound {
                key: key.to_string(),
            })
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    #[instrument(skip(self))]
    async fn hash_get_all(&self, key: &str) -> StorageResult<RawFieldMap> {
        self.single_reads.fetch_add(1, Ordering::SeqCst);
        self.simulate_round_trip().await?;
        self.read_one(key)
    }

    #[instrument(skip(self, keys), fields(key_count = keys.len()))]
    async fn pipelined_hash_get_all(&self, keys: &[String]) -> PipelineResponse {
        self.pipelined_reads.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.simulate_round_trip().await {
            return PipelineResponse::failed(keys.len(), e);
        }

        // Same key twice in one pipeline is answered twice, like Redis would.
        let mut failed: HashSet<&str> = HashSet::new();
        let results = keys
            .iter()
            .map(|key| {
                let result = self.read_one(key);
                if matches!(result, Err(StorageError::QueryError { .. })) {
                    failed.insert(key.as_str());
                }
                result
            })
            .collect();

        PipelineResponse {
            results,
            batch_error: (!failed.is_empty()).then(|| StorageError::QueryError {
                message: format!("{} pipelined command(s) failed", failed.len()),
            }),
        }
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        let start = Instant::now();
        self.simulate_round_trip()
            .await
            .map_err(|e| StorageError::HealthCheckFailed {
                message: e.to_string(),
            })?;
        Ok(HealthStatus {
            healthy: true,
            latency: start.elapsed(),
            message: Some("memory".to_string()),
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
