//! Single-hotel resolver with one fallback probe.

use std::sync::Arc;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument, warn};

use crate::error::{DomainError, DomainResult};
use crate::keys::KeyPair;
use crate::records::{build_room_records, RawFieldMap, RoomRecord};

use super::config::ResolverConfig;
use super::traits::RoomMapReader;

/// Resolves one hotel identifier into its sorted room records.
pub struct RoomResolver<R> {
    reader: Arc<R>,
    config: ResolverConfig,
}

impl<R: RoomMapReader> RoomResolver<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self::with_config(reader, ResolverConfig::default())
    }

    pub fn with_config(reader: Arc<R>, config: ResolverConfig) -> Self {
        Self { reader, config }
    }

    /// Resolves `hotel_id` under the configured lookup deadline.
    pub async fn resolve(&self, hotel_id: &str) -> DomainResult<Vec<RoomRecord>> {
        let deadline = Instant::now() + self.config.lookup_timeout;
        self.resolve_until(hotel_id, deadline).await
    }

    /// Resolves `hotel_id`, sharing `deadline` between both attempts.
    ///
    /// Absent data on both keys resolves to an empty list. A store failure
    /// on the primary attempt is returned; a failure on the fallback attempt
    /// is logged and treated as empty.
    #[instrument(skip(self), fields(hotel_id = %hotel_id))]
    pub async fn resolve_until(
        &self,
        hotel_id: &str,
        deadline: Instant,
    ) -> DomainResult<Vec<RoomRecord>> {
        if hotel_id.trim().is_empty() {
            return Err(DomainError::InvalidIdentifier {
                value: hotel_id.to_string(),
            });
        }

        let keys = KeyPair::for_identifier(hotel_id);

        let primary = match self.read_before(&keys.primary, deadline).await {
            Ok(fields) => fields,
            Err(e) => {
                metrics::counter!("roomap_lookups_total", "path" => "single", "outcome" => "error")
                    .increment(1);
                return Err(e);
            }
        };

        if let Some(fields) = non_empty(primary) {
            let records = self.records_from(hotel_id, &fields);
            metrics::counter!("roomap_lookups_total", "path" => "single", "outcome" => "found")
                .increment(1);
            return Ok(records);
        }

        debug!(key = %keys.alternate, "Primary key empty, trying alternate key");
        metrics::counter!("roomap_key_fallbacks_total", "path" => "single").increment(1);

        let fallback = match self.read_before(&keys.alternate, deadline).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!(key = %keys.alternate, error = %e, "Fallback read failed, treating as empty");
                None
            }
        };

        match non_empty(fallback) {
            Some(fields) => {
                metrics::counter!("roomap_lookups_total", "path" => "single", "outcome" => "fallback")
                    .increment(1);
                Ok(self.records_from(hotel_id, &fields))
            }
            None => {
                metrics::counter!("roomap_lookups_total", "path" => "single", "outcome" => "empty")
                    .increment(1);
                Ok(Vec::new())
            }
        }
    }

    async fn read_before(
        &self,
        key: &str,
        deadline: Instant,
    ) -> DomainResult<Option<RawFieldMap>> {
        match timeout_at(deadline, self.reader.read_hash(key)).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::Timeout {
                duration_ms: self.config.lookup_timeout.as_millis() as u64,
            }),
        }
    }

    fn records_from(&self, hotel_id: &str, fields: &RawFieldMap) -> Vec<RoomRecord> {
        build_room_records(hotel_id, fields, self.config.max_fields_per_hotel)
    }
}

fn non_empty(fields: Option<RawFieldMap>) -> Option<RawFieldMap> {
    fields.filter(|f| !f.is_empty())
}
