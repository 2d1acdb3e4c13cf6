//! Bridges callback-driven asynchronous completion into blocking results.
//!
//! - [`FinishableFuture`]: a single-assignment cell completed exactly once from
//!   any thread and read by any number of blocking readers
//! - [`FutureChain`]: the callback a transport completes; it converts the raw
//!   result into the value type of its target future while the creating
//!   thread's [`Context`](rpc_invoke_core::Context) is restored
//!
//! # Example
//!
//! ```rust
//! use rpc_invoke_core::Context;
//! use rpc_invoke_future::{FinishableFuture, FutureChain};
//! use std::thread;
//!
//! let future: FinishableFuture<usize> = FinishableFuture::new();
//! let chain = FutureChain::new(future.clone(), Context::new().with_scope("getBlock"))
//!     .unwrap()
//!     .with_success_handler(|raw: String| Ok(raw.len()));
//!
//! // The transport completes the chain from its own thread.
//! thread::spawn(move || chain.on_success("0xabcdef".to_string()));
//!
//! assert_eq!(future.get().unwrap(), 8);
//! ```
//!
//! # Cancellation
//!
//! A chain that is dropped without either callback firing (for example
//! because the runtime driving it shut down) cancels its target, and
//! [`FinishableFuture::cancel`] does the same explicitly. Readers then observe
//! [`CoreError::Cancelled`](rpc_invoke_core::CoreError::Cancelled) instead of
//! blocking forever.

mod chain;
mod finishable;

pub use chain::FutureChain;
pub use finishable::FinishableFuture;
