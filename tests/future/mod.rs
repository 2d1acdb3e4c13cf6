//! Tests for the blocking future bridge.
//!
//! Test organization:
//! - single_assignment.rs: first writer wins across threads, timeouts, cancellation
//! - chain.rs: callback conversion, context restoration, tokio bridge

mod chain;
