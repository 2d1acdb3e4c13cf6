//! Bounded call duration.

use rpc_invoke_core::{BoxError, ContextHolder, CoreError, Invocation, TimeoutStrategy};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tower::layer::Layer;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::warn;

/// Layer bounding how long a single attempt may take.
///
/// The attempt runs on a worker thread with the caller's context attached.
/// When the bound elapses the caller gets [`CoreError::Timeout`] while the
/// worker keeps running to completion and its result is discarded: a blocking
/// call cannot be interrupted from outside.
///
/// Every timed-out attempt therefore leaves a detached OS thread behind until
/// the call returns. Against a peer that hangs, a request retried `count`
/// times can leave up to `1 + count` such threads running, so keep retry
/// counts small when a timeout is configured.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutLayer {
    timeout: Duration,
}

impl TimeoutLayer {
    /// Creates a layer from a timeout strategy.
    pub fn new(strategy: &TimeoutStrategy) -> Self {
        #[cfg(feature = "metrics")]
        describe_counter!("rpc_timeouts_total", "Total number of attempts that timed out");

        Self {
            timeout: strategy.timeout(),
        }
    }

    /// The bound applied to each attempt.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<T> Layer<Invocation<T>> for TimeoutLayer
where
    T: Send + 'static,
{
    type Service = Invocation<T>;

    fn layer(&self, invocation: Invocation<T>) -> Self::Service {
        let timeout = self.timeout;
        invocation.wrap(move |inner| call_with_timeout(inner, timeout))
    }
}

fn call_with_timeout<T>(invocation: &Invocation<T>, timeout: Duration) -> Result<T, BoxError>
where
    T: Send + 'static,
{
    let context = ContextHolder::get();
    let worker = invocation.clone();
    let (tx, rx) = mpsc::sync_channel(1);

    thread::Builder::new()
        .name(thread_name(invocation.name()))
        .spawn(move || {
            let result = match context {
                Some(context) => ContextHolder::run_with(context, || worker.invoke()),
                None => worker.invoke(),
            };
            // The caller may have stopped waiting.
            let _ = tx.send(result);
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            #[cfg(feature = "tracing")]
            warn!(invocation = %invocation.name(), timeout = ?timeout, "invocation timed out");
            #[cfg(feature = "metrics")]
            counter!("rpc_timeouts_total", "scope" => scope(invocation)).increment(1);

            Err(CoreError::Timeout { after: timeout }.into())
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(format!("invocation {} panicked", invocation.name()).into())
        }
    }
}

// Thread names may not contain NUL bytes.
fn thread_name(invocation: &str) -> String {
    format!("rpc-call-{}", invocation.replace('\0', ""))
}

#[cfg(feature = "metrics")]
fn scope<T>(invocation: &Invocation<T>) -> String {
    ContextHolder::get()
        .map(|context| context.scope().to_string())
        .unwrap_or_else(|| invocation.name().to_string())
}
