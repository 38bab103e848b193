//! Property-based tests for hashing and aggregation guarantees
