use crate::FinishableFuture;
use rpc_invoke_core::{BoxError, Context, ContextHolder, CoreError};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

type SuccessHandler<R, T> = Box<dyn FnOnce(R) -> Result<T, BoxError> + Send>;

/// Callback adapter completing a [`FinishableFuture`] from an asynchronous result.
///
/// The transport calls exactly one of [`on_success`](Self::on_success) or
/// [`on_failure`](Self::on_failure); both consume the chain, so a second
/// completion cannot be expressed. While the callback runs, the context
/// captured at creation is attached to the callback thread.
///
/// A chain dropped before either callback fires cancels its target.
pub struct FutureChain<R, T> {
    target: Option<FinishableFuture<T>>,
    context: Option<Context>,
    success_handler: Option<SuccessHandler<R, T>>,
}

impl<R, T> FutureChain<R, T> {
    /// Creates a chain completing `target` under `context`.
    ///
    /// Fails with [`CoreError::InvalidArgument`] if `target` is already
    /// complete, since whatever the chain produced would be silently lost.
    pub fn new(target: FinishableFuture<T>, context: Context) -> Result<Self, CoreError> {
        if target.is_done() {
            return Err(CoreError::InvalidArgument(
                "target future is already complete".to_string(),
            ));
        }

        #[cfg(feature = "metrics")]
        describe_counter!(
            "future_chain_completions_total",
            "Total number of future chain completions by result"
        );

        Ok(Self {
            target: Some(target),
            context: Some(context),
            success_handler: None,
        })
    }

    /// Creates a chain capturing the context attached to the current thread.
    ///
    /// Fails with [`CoreError::Configuration`] if no context is attached.
    pub fn capture(target: FinishableFuture<T>) -> Result<Self, CoreError> {
        let context = ContextHolder::get().ok_or_else(|| {
            CoreError::Configuration("no context attached to the current thread".to_string())
        })?;
        Self::new(target, context)
    }

    /// Registers the conversion applied to a raw successful result.
    pub fn set_success_handler<F>(&mut self, handler: F)
    where
        F: FnOnce(R) -> Result<T, BoxError> + Send + 'static,
    {
        self.success_handler = Some(Box::new(handler));
    }

    /// Builder-style form of [`set_success_handler`](Self::set_success_handler).
    pub fn with_success_handler<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(R) -> Result<T, BoxError> + Send + 'static,
    {
        self.set_success_handler(handler);
        self
    }

    /// Completes the target with the converted `raw` value.
    ///
    /// Without a success handler the target fails with
    /// [`CoreError::NoSuccessHandler`]. A handler that returns an error, or
    /// panics, fails the target instead.
    pub fn on_success(mut self, raw: R) {
        let Some(target) = self.target.take() else {
            return;
        };
        let _guard = self.context.take().map(ContextHolder::attach);

        let Some(handler) = self.success_handler.take() else {
            #[cfg(feature = "tracing")]
            debug!(scope = %scope(), "no success handler registered");
            #[cfg(feature = "metrics")]
            counter!("future_chain_completions_total", "result" => "no_handler").increment(1);

            target.fail(CoreError::NoSuccessHandler);
            return;
        };

        match catch_unwind(AssertUnwindSafe(|| handler(raw))) {
            Ok(Ok(value)) => {
                #[cfg(feature = "tracing")]
                trace!(scope = %scope(), "complete future with converted value");
                #[cfg(feature = "metrics")]
                counter!("future_chain_completions_total", "result" => "success").increment(1);

                target.success(value);
            }
            Ok(Err(error)) => {
                #[cfg(feature = "tracing")]
                debug!(scope = %scope(), error = %error, "success handler failed");
                #[cfg(feature = "metrics")]
                counter!("future_chain_completions_total", "result" => "failure").increment(1);

                target.fail(error);
            }
            Err(panic) => {
                let message = match panic_message(panic.as_ref()) {
                    Some(detail) => format!("success handler panicked: {detail}"),
                    None => "success handler panicked".to_string(),
                };

                #[cfg(feature = "tracing")]
                debug!(scope = %scope(), error = %message, "success handler panicked");
                #[cfg(feature = "metrics")]
                counter!("future_chain_completions_total", "result" => "failure").increment(1);

                target.fail(message);
            }
        }
    }

    /// Completes the target with `cause`.
    pub fn on_failure(mut self, cause: impl Into<BoxError>) {
        let Some(target) = self.target.take() else {
            return;
        };
        let _guard = self.context.take().map(ContextHolder::attach);
        let cause = cause.into();

        #[cfg(feature = "tracing")]
        debug!(scope = %scope(), error = %cause, "complete future with failure");
        #[cfg(feature = "metrics")]
        counter!("future_chain_completions_total", "result" => "failure").increment(1);

        target.fail(cause);
    }
}

impl<R, T> FutureChain<R, T>
where
    R: Send + 'static,
    T: Send + 'static,
{
    /// Drives this chain from `future` on the runtime behind `handle`.
    ///
    /// If the task is aborted or the runtime shuts down first, the chain is
    /// dropped and its target cancelled.
    pub fn listen<F, E>(self, future: F, handle: &Handle) -> JoinHandle<()>
    where
        F: Future<Output = Result<R, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        handle.spawn(async move {
            match future.await {
                Ok(raw) => self.on_success(raw),
                Err(cause) => self.on_failure(cause),
            }
        })
    }
}

impl<R, T> Drop for FutureChain<R, T> {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            #[cfg(feature = "tracing")]
            debug!("future chain dropped before completion");
            #[cfg(feature = "metrics")]
            counter!("future_chain_completions_total", "result" => "cancelled").increment(1);

            target.cancel();
        }
    }
}

impl<R, T> fmt::Debug for FutureChain<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutureChain")
            .field("target", &self.target)
            .field("context", &self.context)
            .field("has_success_handler", &self.success_handler.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

#[cfg(feature = "tracing")]
fn scope() -> String {
    ContextHolder::get()
        .map(|context| context.scope().to_string())
        .unwrap_or_default()
}
