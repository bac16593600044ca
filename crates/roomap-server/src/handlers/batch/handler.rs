//! Batch lookup handler implementation.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use roomap_domain::{
    build_room_records, BatchRead, DomainError, DomainResult, KeyPair, RawFieldMap,
    ResolverConfig, RoomMapReader, RoomRecord,
};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument, warn};

use super::types::{BatchLookupError, BatchLookupRequest, BatchLookupResponse, BatchLookupResult};

/// Handler for multi-hotel room lookups.
///
/// Every distinct identifier contributes its primary and alternate key to
/// one pipelined read, bounded by a single batch deadline.
pub struct BatchLookupHandler<R> {
    reader: Arc<R>,
    config: ResolverConfig,
}

impl<R: RoomMapReader> BatchLookupHandler<R> {
    /// Creates a new batch lookup handler.
    pub fn new(reader: Arc<R>, config: ResolverConfig) -> Self {
        Self { reader, config }
    }

    /// Validates a batch lookup request.
    pub fn validate(&self, request: &BatchLookupRequest) -> BatchLookupResult<()> {
        if request.hotel_ids.is_empty() {
            return Err(BatchLookupError::EmptyBatch);
        }

        if request.hotel_ids.len() > self.config.max_batch_size {
            return Err(BatchLookupError::BatchTooLarge {
                size: request.hotel_ids.len(),
                max: self.config.max_batch_size,
            });
        }

        Ok(())
    }

    /// Executes a batch lookup.
    ///
    /// Validation happens before any store access. Store failures are
    /// contained per identifier and resolve to an empty room list.
    #[instrument(skip(self, request), fields(requested = request.hotel_ids.len()))]
    pub async fn resolve(
        &self,
        request: BatchLookupRequest,
    ) -> BatchLookupResult<BatchLookupResponse> {
        self.validate(&request)?;

        let identifiers = unique_identifiers(&request.hotel_ids);
        let mut hotels = BTreeMap::new();

        if identifiers.is_empty() {
            debug!("Batch contained only empty identifiers");
            return Ok(BatchLookupResponse { hotels });
        }

        metrics::counter!("roomap_batch_identifiers_total").increment(identifiers.len() as u64);

        // [primary_0, alternate_0, primary_1, alternate_1, ...]
        let keys: Vec<String> = identifiers
            .iter()
            .flat_map(|id| {
                let pair = KeyPair::for_identifier(id);
                [pair.primary, pair.alternate]
            })
            .collect();

        let read = self.read_before_deadline(&keys).await;
        if let Some(e) = &read.error {
            warn!(
                error = %e,
                identifiers = identifiers.len(),
                "Batch read reported an error, reconciling per identifier"
            );
        }

        let mut entries = read.entries.into_iter();
        for (index, hotel_id) in identifiers.into_iter().enumerate() {
            let primary = usable(entries.next(), &keys[2 * index]);
            let alternate = usable(entries.next(), &keys[2 * index + 1]);
            let records = self.reconcile(hotel_id, primary, alternate);
            hotels.insert(hotel_id.to_string(), records);
        }

        Ok(BatchLookupResponse { hotels })
    }

    async fn read_before_deadline(&self, keys: &[String]) -> BatchRead {
        let deadline = Instant::now() + self.config.batch_timeout;
        match timeout_at(deadline, self.reader.read_hashes(keys)).await {
            Ok(read) => read,
            Err(_) => {
                let duration_ms = self.config.batch_timeout.as_millis() as u64;
                warn!(duration_ms, keys = keys.len(), "Batch read timed out");
                BatchRead::failed(keys.len(), DomainError::Timeout { duration_ms })
            }
        }
    }

    fn reconcile(
        &self,
        hotel_id: &str,
        primary: Option<RawFieldMap>,
        alternate: Option<RawFieldMap>,
    ) -> Vec<RoomRecord> {
        let (fields, outcome) = match (primary, alternate) {
            (Some(fields), _) => (fields, "found"),
            (None, Some(fields)) => {
                metrics::counter!("roomap_key_fallbacks_total", "path" => "batch").increment(1);
                (fields, "fallback")
            }
            (None, None) => {
                metrics::counter!("roomap_lookups_total", "path" => "batch", "outcome" => "empty")
                    .increment(1);
                return Vec::new();
            }
        };

        metrics::counter!("roomap_lookups_total", "path" => "batch", "outcome" => outcome)
            .increment(1);
        build_room_records(hotel_id, &fields, self.config.max_fields_per_hotel)
    }
}

/// Deduplicates identifiers preserving first occurrence, dropping blank ones.
fn unique_identifiers(hotel_ids: &[String]) -> Vec<&str> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(hotel_ids.len());
    hotel_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !is_blank(id) && seen.insert(*id))
        .collect()
}

fn is_blank(hotel_id: &str) -> bool {
    hotel_id.trim().is_empty()
}

/// Non-empty map from one pipelined sub-result, logging failures.
fn usable(entry: Option<DomainResult<Option<RawFieldMap>>>, key: &str) -> Option<RawFieldMap> {
    match entry {
        Some(Ok(fields)) => fields.filter(|f| !f.is_empty()),
        Some(Err(e)) => {
            debug!(key, error = %e, "Batch sub-result failed, treating as empty");
            None
        }
        None => {
            warn!(key, "Batch read returned fewer results than keys");
            None
        }
    }
}
