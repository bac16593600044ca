//! roomap-storage: Store capability layer
//!
//! This crate provides the key-value store abstraction for the room
//! mapping cache, including:
//! - RoomStore trait for hash reads, pipelined hash reads and health checks
//! - In-memory implementation for tests and local development
//! - Redis implementation (single node or cluster) for production
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               roomap-storage                 │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs   - RoomStore trait definition   │
//! │  memory.rs   - In-memory implementation     │
//! │  redis.rs    - Redis implementation         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The store is populated by an external producer. Nothing in this crate
//! writes to Redis.

pub mod error;
pub mod memory;
pub mod redis;
pub mod traits;

// Re-export commonly used types
pub use error::{HealthStatus, StorageError, StorageResult};
pub use memory::MemoryRoomStore;
pub use redis::{RedisConfig, RedisRoomStore};
pub use traits::{PipelineResponse, RawFieldMap, RoomStore};
