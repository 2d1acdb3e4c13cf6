//! Core infrastructure for rpc-invoke.
//!
//! This crate holds the vocabulary shared by every other rpc-invoke crate:
//! - [`Invocation`] and [`Response`]: a named, repeatable unit of remote work and
//!   the outcome of one attempt at it
//! - [`Context`] and [`ContextHolder`]: immutable per-call configuration and its
//!   thread-scoped propagation
//! - [`Strategy`]: the closed set of policies a [`Context`] can carry
//! - [`CoreError`]: typed failures raised by the core itself
//! - Event system for observability
//!
//! # Example
//!
//! ```rust
//! use rpc_invoke_core::{Context, ContextHolder, Invocation, RetryStrategy, Strategy};
//! use std::time::Duration;
//!
//! let context = Context::new()
//!     .with_strategy(Strategy::Retry(RetryStrategy::new(3, Duration::ZERO).unwrap()))
//!     .with_scope("getBlock");
//!
//! let invocation = Invocation::<String>::builder("getBlock")
//!     .parameter(42u64)
//!     .build(|| Ok::<_, rpc_invoke_core::BoxError>("block".to_string()));
//!
//! {
//!     let _guard = ContextHolder::attach(context);
//!     assert_eq!(ContextHolder::get().unwrap().scope(), "getBlock");
//!     assert_eq!(invocation.invoke().unwrap(), "block");
//! }
//! assert!(ContextHolder::get().is_none());
//! ```

pub mod context;
pub mod error;
pub mod events;
pub mod invocation;
pub mod strategy;

pub use context::{Context, ContextGuard, ContextHolder, ContextStorage};
pub use error::{BoxError, CoreError, SharedError};
pub use events::{EventListener, EventListeners, FnListener, InvocationEvent};
pub use invocation::{Invocation, InvocationBuilder, Parameter, Response};
pub use strategy::{
    ConnectStrategy, ConnectStrategyBuilder, Connector, FailoverStrategy, RetryPolicy,
    RetryStrategy, Strategy, StrategyKind, TimeoutStrategy,
};
