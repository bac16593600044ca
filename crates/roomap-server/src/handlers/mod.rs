//! Request handlers.

pub mod batch;

pub use batch::{
    BatchLookupError, BatchLookupHandler, BatchLookupRequest, BatchLookupResponse,
    BatchLookupResult,
};
