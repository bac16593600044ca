//! Tests for the single-hotel resolver.
//!
//! Organized by functionality:
//! - Primary key resolution
//! - Alternate key fallback
//! - Error propagation and degradation
//! - Deadlines
