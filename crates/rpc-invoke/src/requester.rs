use crate::config::{RequesterConfig, RequesterConfigBuilder};
use crate::error::RpcError;
use crate::events::RequestEvent;
use rpc_invoke_core::{BoxError, Context, ContextHolder, ContextStorage, Invocation, Response};
use rpc_invoke_failover::FailoverHandlerChain;
use rpc_invoke_future::{FinishableFuture, FutureChain};
use rpc_invoke_strategy::StrategyChain;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Executes invocations under the current context.
///
/// Each request derives a context scoped to the invocation name from the
/// context attached to the calling thread, or from the requester's
/// [`ContextStorage`] when none is attached. The derived context stays
/// attached while the decorated call and any failover run, and the previous
/// context is restored on every exit path.
#[derive(Clone, Debug)]
pub struct Requester {
    config: Arc<RequesterConfig>,
}

enum Outcome<T> {
    Success(T),
    Recovered(T),
    Failed(BoxError),
}

impl Requester {
    pub(crate) fn new(config: RequesterConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "rpc_requests_total",
                "Total number of requests by scope and result (success, recovered or error)"
            );
            describe_histogram!(
                "rpc_request_duration_seconds",
                "Request duration in seconds, failover included"
            );
        }

        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new configuration builder.
    pub fn builder() -> RequesterConfigBuilder {
        RequesterConfig::builder()
    }

    /// The storage holding the base context.
    pub fn context_storage(&self) -> &ContextStorage {
        &self.config.storage
    }

    /// Runs `invocation` and returns its value or exactly one error.
    ///
    /// The call is decorated by the stages the context asks for. If it fails,
    /// the failure goes through the context's failover handlers; what they
    /// cannot recover is converted by the exception converter.
    pub fn request<T>(&self, invocation: Invocation<T>) -> Result<T, RpcError>
    where
        T: Send + 'static,
    {
        let start = Instant::now();
        let base = ContextHolder::get().unwrap_or_else(|| self.config.storage.get());
        let context = base.with_scope(invocation.name());
        let _guard = ContextHolder::attach(context.clone());

        let outcome = self.execute(&context, invocation);
        let duration = start.elapsed();
        let scope = context.scope().to_string();

        #[cfg(feature = "metrics")]
        histogram!("rpc_request_duration_seconds", "scope" => scope.clone())
            .record(duration.as_secs_f64());

        match outcome {
            Outcome::Success(value) => {
                #[cfg(feature = "metrics")]
                counter!("rpc_requests_total", "scope" => scope.clone(), "result" => "success")
                    .increment(1);

                self.emit_success(scope, duration, false);
                Ok(value)
            }
            Outcome::Recovered(value) => {
                #[cfg(feature = "metrics")]
                counter!("rpc_requests_total", "scope" => scope.clone(), "result" => "recovered")
                    .increment(1);

                self.emit_success(scope, duration, true);
                Ok(value)
            }
            Outcome::Failed(error) => {
                let error = self.config.converter.convert(error);

                #[cfg(feature = "tracing")]
                warn!(
                    requester = %self.config.name,
                    scope = %scope,
                    kind = %error.kind(),
                    error = %error,
                    "request failed"
                );
                #[cfg(feature = "metrics")]
                counter!("rpc_requests_total", "scope" => scope.clone(), "result" => "error")
                    .increment(1);

                self.config.event_listeners.emit(&RequestEvent::Error {
                    scope,
                    timestamp: Instant::now(),
                    duration,
                    kind: error.kind(),
                });
                Err(error)
            }
        }
    }

    /// Runs `invocation` on a blocking thread of the runtime behind `handle`.
    ///
    /// The context attached to the calling thread, or the stored one, is
    /// attached on the worker thread too. The returned future completes with
    /// the value, or fails with the [`RpcError`] as its cause. If the runtime
    /// drops the task before it runs, the future is cancelled.
    pub fn spawn<T>(&self, invocation: Invocation<T>, handle: &Handle) -> FinishableFuture<T>
    where
        T: Send + 'static,
    {
        let future = FinishableFuture::new();
        let context: Context =
            ContextHolder::get().unwrap_or_else(|| self.config.storage.get());

        let chain = match FutureChain::new(future.clone(), context.clone()) {
            Ok(chain) => chain.with_success_handler(Ok),
            Err(error) => {
                future.fail(error);
                return future;
            }
        };

        let requester = self.clone();
        handle.spawn_blocking(move || {
            let result = ContextHolder::run_with(context, || requester.request(invocation));
            match result {
                Ok(value) => chain.on_success(value),
                Err(error) => chain.on_failure(error),
            }
        });

        future
    }

    fn execute<T>(&self, context: &Context, invocation: Invocation<T>) -> Outcome<T>
    where
        T: Send + 'static,
    {
        let decorated = StrategyChain::of(context).apply(invocation);
        let error = match catch_unwind(AssertUnwindSafe(|| decorated.invoke())) {
            Ok(Ok(value)) => return Outcome::Success(value),
            Ok(Err(error)) => error,
            Err(_panic) => format!("invocation {} panicked", decorated.name()).into(),
        };

        let failover = FailoverHandlerChain::from_context(context);
        if failover.is_empty() {
            return Outcome::Failed(error);
        }

        #[cfg(feature = "tracing")]
        debug!(
            requester = %self.config.name,
            scope = %context.scope(),
            handlers = failover.len(),
            error = %error,
            "routing failure to failover"
        );

        match failover.handle(&decorated, Response::Failure(error)) {
            Response::Success(value) => Outcome::Recovered(value),
            Response::Failure(error) => Outcome::Failed(error),
        }
    }

    fn emit_success(&self, scope: String, duration: Duration, recovered: bool) {
        let timestamp = Instant::now();
        let event = if recovered {
            RequestEvent::Recovered {
                scope,
                timestamp,
                duration,
            }
        } else {
            RequestEvent::Success {
                scope,
                timestamp,
                duration,
            }
        };
        self.config.event_listeners.emit(&event);
    }
}

impl Default for Requester {
    fn default() -> Self {
        Self::new(RequesterConfig {
            name: "<unnamed>".to_string(),
            storage: ContextStorage::default(),
            converter: Arc::new(crate::TransportExceptionConverter),
            event_listeners: Default::default(),
        })
    }
}
