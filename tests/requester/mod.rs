//! End-to-end tests for the requester.
//!
//! Test organization:
//! - end_to_end.rs: decorated calls, failover recovery and error conversion
//! - cleanup.rs: context release on every exit path
//! - isolation.rs: concurrent requests on separate threads
//! - spawn.rs: requests completed through a finishable future
//! - events.rs: request events and logging

mod cleanup;
mod events;
mod spawn;
