//! Property-based tests for rpc-invoke.
//!
//! Run with: cargo test --test property_tests
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold across the future bridge and failover handling.

pub mod future;
