//! Application state for HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use roomap_domain::{ResolverConfig, RoomResolver};
use roomap_server::handlers::batch::BatchLookupHandler;
use roomap_storage::RoomStore;

use crate::adapters::StoreRoomMapReader;
use crate::encoding::GzipPool;

/// Timeout applied to the `/health` probe when none is configured.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Application state shared across all HTTP handlers.
///
/// The store is injected once; the single-hotel resolver and the batch
/// handler both read it through the same `StoreRoomMapReader` adapter.
///
/// # Type Parameters
///
/// * `S` - The storage backend implementing `RoomStore`
#[derive(Clone)]
pub struct AppState<S: RoomStore> {
    /// The storage backend.
    pub store: Arc<S>,
    /// Resolver for single-hotel lookups.
    pub resolver: Arc<RoomResolver<StoreRoomMapReader<S>>>,
    /// Handler for pipelined batch lookups.
    pub batch_handler: Arc<BatchLookupHandler<StoreRoomMapReader<S>>>,
    /// Compressors reused across gzip responses.
    pub gzip: Arc<GzipPool>,
    /// Deadline for the `/health` probe.
    pub health_timeout: Duration,
}

impl<S: RoomStore> AppState<S> {
    /// Creates a new application state with default resolver settings.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, ResolverConfig::default(), DEFAULT_HEALTH_TIMEOUT)
    }

    /// Creates a new application state with explicit resolver settings.
    pub fn with_config(store: Arc<S>, config: ResolverConfig, health_timeout: Duration) -> Self {
        let reader = Arc::new(StoreRoomMapReader::new(Arc::clone(&store)));

        let resolver = Arc::new(RoomResolver::with_config(
            Arc::clone(&reader),
            config.clone(),
        ));
        let batch_handler = Arc::new(BatchLookupHandler::new(reader, config));

        Self {
            store,
            resolver,
            batch_handler,
            gzip: Arc::new(GzipPool::default()),
            health_timeout,
        }
    }
}
