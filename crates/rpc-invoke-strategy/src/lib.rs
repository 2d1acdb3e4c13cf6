//! Decorators composed from the strategies attached to a context.
//!
//! A [`StrategyChain`] reads a [`Context`](rpc_invoke_core::Context) and
//! wraps an [`Invocation`](rpc_invoke_core::Invocation) in the stages it
//! asks for. Each stage is a tower [`Layer`](tower::Layer) whose service is
//! again an `Invocation`, so decorated calls keep the same shape:
//!
//! - [`ConnectLayer`]: connects through the configured connector before the
//!   call when no connection exists
//! - [`TimeoutLayer`]: fails the attempt with
//!   [`CoreError::Timeout`](rpc_invoke_core::CoreError::Timeout) when it runs
//!   longer than the configured bound
//!
//! # Example
//!
//! ```rust
//! use rpc_invoke_core::{BoxError, Context, Invocation, TimeoutStrategy};
//! use rpc_invoke_strategy::StrategyChain;
//! use std::time::Duration;
//!
//! let context = Context::new()
//!     .with_strategy(TimeoutStrategy::new(Duration::from_millis(500)).unwrap());
//!
//! let invocation = Invocation::new("getBlockCount", || Ok::<_, BoxError>(1024u64));
//! let decorated = StrategyChain::of(&context).apply(invocation);
//! assert_eq!(decorated.invoke().unwrap(), 1024);
//! ```

mod chain;
mod connect;
mod timeout;

pub use chain::StrategyChain;
pub use connect::ConnectLayer;
pub use timeout::TimeoutLayer;
