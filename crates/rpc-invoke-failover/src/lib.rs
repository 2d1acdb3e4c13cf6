//! Failover handling for rpc-invoke.
//!
//! After an invocation fails, its [`Response`](rpc_invoke_core::Response) is
//! passed through a [`FailoverHandlerChain`]: handlers run in ascending
//! priority order until one of them produces a successful response.
//!
//! - [`JustRetryFailoverHandler`]: re-invokes the call up to `count` times,
//!   sleeping between attempts
//! - [`IntervalFunction`]: pluggable pause between retries
//!   ([`FixedInterval`], [`ExponentialBackoff`])
//! - [`FailoverEvent`]: retry, success and exhaustion events
//!
//! # Examples
//!
//! ```
//! use rpc_invoke_core::{BoxError, Invocation, Response};
//! use rpc_invoke_failover::{FailoverHandler, FailoverHandlerChain, JustRetryFailoverHandler};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let c = Arc::clone(&calls);
//! let invocation = Invocation::new("getBlockCount", move || {
//!     if c.fetch_add(1, Ordering::SeqCst) < 1 {
//!         Err::<u64, BoxError>("connection reset".into())
//!     } else {
//!         Ok(1024)
//!     }
//! });
//!
//! let retry = JustRetryFailoverHandler::builder()
//!     .count(3)
//!     .interval(Duration::from_millis(1))
//!     .build()
//!     .unwrap();
//! let chain = FailoverHandlerChain::new([Arc::new(retry) as Arc<dyn FailoverHandler<u64>>]);
//!
//! let first = invocation.attempt();
//! let response = chain.handle(&invocation, first);
//! assert_eq!(response.value(), Some(&1024));
//! ```

mod backoff;
mod chain;
mod events;
mod handler;

pub use backoff::{ExponentialBackoff, FixedInterval, IntervalFunction};
pub use chain::FailoverHandlerChain;
pub use events::FailoverEvent;
pub use handler::{FailoverHandler, JustRetryFailoverHandler, JustRetryFailoverHandlerBuilder};
