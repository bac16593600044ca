//! Configuration for the room resolvers.

use std::time::Duration;

/// Default deadline for a single-hotel lookup (both attempts).
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default deadline for one batched round-trip.
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default maximum number of identifiers per batch request.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Default maximum number of raw fields read from one hotel's hash.
pub const DEFAULT_MAX_FIELDS_PER_HOTEL: usize = 2000;

/// Configuration shared by the single-hotel and batch resolvers.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Deadline covering the primary and fallback attempts of a single lookup.
    pub lookup_timeout: Duration,
    /// Deadline covering the whole pipelined batch round-trip.
    ///
    /// Kept tighter than `lookup_timeout` since it bounds the latency of
    /// a request that touches many hotels.
    pub batch_timeout: Duration,
    /// Maximum number of identifiers accepted in one batch.
    pub max_batch_size: usize,
    /// Maximum number of raw fields visited per hotel hash.
    pub max_fields_per_hotel: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_fields_per_hotel: DEFAULT_MAX_FIELDS_PER_HOTEL,
        }
    }
}

impl ResolverConfig {
    /// Creates a new configuration with the specified lookup timeout.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Creates a new configuration with the specified batch timeout.
    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = timeout;
        self
    }

    /// Creates a new configuration with the specified batch size cap.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Creates a new configuration with the specified per-hotel field cap.
    pub fn with_max_fields_per_hotel(mut self, max_fields: usize) -> Self {
        self.max_fields_per_hotel = max_fields;
        self
    }
}
