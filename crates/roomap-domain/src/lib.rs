//! roomap-domain: Room mapping resolution logic
//!
//! This crate contains the pure and orchestration logic that turns a hotel
//! identifier into a sorted list of `{name, id}` room records:
//! - Room name normalization
//! - Stored record decoding
//! - Store key strategy (hash-tagged vs untagged identifiers)
//! - Record assembly with a deterministic collision policy
//! - Single-hotel resolver with one fallback probe
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                roomap-domain                 │
//! ├─────────────────────────────────────────────┤
//! │  normalize.rs - Room name canonicalization  │
//! │  decode.rs    - Field blob -> room id       │
//! │  keys.rs      - Primary/alternate keys      │
//! │  records.rs   - RoomRecord assembly         │
//! │  resolver/    - Single-hotel resolution     │
//! └─────────────────────────────────────────────┘
//! ```

pub mod decode;
pub mod error;
pub mod keys;
pub mod normalize;
mod normalize_proptest;
pub mod records;
pub mod resolver;

// Re-export commonly used types at the crate root
pub use decode::{decode_room_id, try_decode_room_id, DecodeError};
pub use error::{DomainError, DomainResult};
pub use keys::{alternate_of, alternate_key_of, primary_key_of, KeyPair, HASH_TAG_MARKER};
pub use normalize::normalize_room_name;
pub use records::{build_room_records, RawFieldMap, RoomRecord};
pub use resolver::{BatchRead, ResolverConfig, RoomMapReader, RoomResolver};
