//! Property-based tests for normalization and key strategy.
