//! Batch room lookups with intra-batch deduplication.
//!
//! One request resolves many hotels in a single pipelined store
//! round-trip: both keys of every distinct identifier are read together,
//! and each identifier falls back to its alternate key using the sub-result
//! from that same round-trip.
//!
//! Failures never surface per identifier. A hotel whose keys failed or were
//! empty maps to an empty room list, so the response shape is uniform.

mod handler;
mod types;

pub use handler::BatchLookupHandler;
pub use types::{
    BatchLookupError, BatchLookupRequest, BatchLookupResponse, BatchLookupResult, MAX_BATCH_SIZE,
};
