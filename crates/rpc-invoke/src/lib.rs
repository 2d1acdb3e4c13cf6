//! Resilient invocation core for RPC clients.
//!
//! `rpc-invoke` turns "call this remote operation" into a reliably delivered
//! result. A transport supplies [`Invocation`]s; a client attaches
//! [`Strategy`] values to a [`Context`]; the [`Requester`] runs each
//! invocation under that context:
//!
//! 1. derive a context scoped to the invocation name and attach it to the
//!    calling thread
//! 2. decorate the call with the context's stages (connect outermost, then
//!    timeout, then the raw call)
//! 3. on failure, pass the [`Response`] through the priority-ordered
//!    [`FailoverHandlerChain`]
//! 4. convert anything still failing into a single [`RpcError`]
//! 5. restore the previous context
//!
//! Asynchronous transports complete a [`FinishableFuture`] through a
//! [`FutureChain`], which restores the creating thread's context while its
//! callback runs.
//!
//! # Crates
//!
//! - `rpc-invoke-core`: invocations, responses, contexts, strategies, events
//! - `rpc-invoke-strategy`: connect and timeout decorators
//! - `rpc-invoke-failover`: failover handlers and retry backoff
//! - `rpc-invoke-future`: the blocking future bridge
//!
//! # Example
//!
//! ```rust
//! use rpc_invoke::{BoxError, Invocation, Requester};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let requester = Requester::builder()
//!     .name("node-client")
//!     .timeout(Duration::from_secs(1))
//!     .retry(3, Duration::from_millis(1))
//!     .build()
//!     .unwrap();
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let c = Arc::clone(&calls);
//! let invocation = Invocation::<u64>::builder("getBlockCount")
//!     .parameter("main")
//!     .build(move || {
//!         if c.fetch_add(1, Ordering::SeqCst) < 2 {
//!             Err::<u64, BoxError>("connection reset".into())
//!         } else {
//!             Ok(42)
//!         }
//!     });
//!
//! assert_eq!(requester.request(invocation).unwrap(), 42);
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! ```
//!
//! # Feature Flags
//!
//! - `metrics`: counters and histograms through the `metrics` facade
//! - `tracing`: structured logs through the `tracing` crate

mod config;
mod converter;
mod error;
mod events;
mod requester;

pub use config::{RequesterConfig, RequesterConfigBuilder};
pub use converter::{ExceptionConverter, TransportExceptionConverter};
pub use error::{ErrorKind, RpcError};
pub use events::RequestEvent;
pub use requester::Requester;

pub use rpc_invoke_core::{
    BoxError, ConnectStrategy, Connector, Context, ContextGuard, ContextHolder,
    ContextStorage, CoreError, FailoverStrategy, Invocation, InvocationBuilder, Response,
    RetryPolicy, RetryStrategy, Strategy, StrategyKind, TimeoutStrategy,
};
pub use rpc_invoke_failover::{
    ExponentialBackoff, FailoverEvent, FailoverHandler, FailoverHandlerChain, FixedInterval,
    IntervalFunction, JustRetryFailoverHandler,
};
pub use rpc_invoke_future::{FinishableFuture, FutureChain};
pub use rpc_invoke_strategy::{ConnectLayer, StrategyChain, TimeoutLayer};
