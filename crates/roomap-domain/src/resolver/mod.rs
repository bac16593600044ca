//! Single-hotel room map resolution.
//!
//! The resolver probes the primary key for a hotel, falls back to the
//! alternate key once when the primary hash is absent or empty, and turns
//! the winning hash into sorted [`RoomRecord`](crate::RoomRecord)s.

mod config;
mod room_resolver;
mod traits;

#[cfg(test)]
mod tests;

pub use config::{
    ResolverConfig, DEFAULT_BATCH_TIMEOUT, DEFAULT_LOOKUP_TIMEOUT, DEFAULT_MAX_BATCH_SIZE,
    DEFAULT_MAX_FIELDS_PER_HOTEL,
};
pub use room_resolver::RoomResolver;
pub use traits::{BatchRead, RoomMapReader};
