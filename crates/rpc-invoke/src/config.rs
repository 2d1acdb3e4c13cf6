use crate::converter::{ExceptionConverter, TransportExceptionConverter};
use crate::error::ErrorKind;
use crate::events::RequestEvent;
use crate::Requester;
use rpc_invoke_core::events::{EventListeners, FnListener};
use rpc_invoke_core::{
    ConnectStrategy, Context, ContextStorage, CoreError, FailoverStrategy, RetryStrategy, Strategy,
    TimeoutStrategy,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a [`Requester`].
pub struct RequesterConfig {
    pub(crate) name: String,
    pub(crate) storage: ContextStorage,
    pub(crate) converter: Arc<dyn ExceptionConverter>,
    pub(crate) event_listeners: EventListeners<RequestEvent>,
}

impl RequesterConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RequesterConfigBuilder {
        RequesterConfigBuilder::new()
    }
}

impl fmt::Debug for RequesterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequesterConfig")
            .field("name", &self.name)
            .field("storage", &self.storage)
            .field("event_listeners", &self.event_listeners)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RequesterConfig`].
pub struct RequesterConfigBuilder {
    name: String,
    context: Option<Context>,
    storage: Option<ContextStorage>,
    timeout: Option<Duration>,
    retry: Option<(usize, Duration)>,
    connect: Option<ConnectStrategy>,
    failover: Option<FailoverStrategy>,
    converter: Arc<dyn ExceptionConverter>,
    event_listeners: EventListeners<RequestEvent>,
}

impl Default for RequesterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequesterConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - name: `"<unnamed>"`
    /// - context: empty, held in a fresh [`ContextStorage`]
    /// - no timeout, retry, connect or failover strategy
    /// - exception converter: [`TransportExceptionConverter`]
    pub fn new() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            context: None,
            storage: None,
            timeout: None,
            retry: None,
            connect: None,
            failover: None,
            converter: Arc::new(TransportExceptionConverter),
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the name for this requester (used in logs).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the base context used when the calling thread has none attached.
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Shares `storage` as the source of the base context.
    ///
    /// Later changes to the storage apply to subsequent requests. A context
    /// set with [`context`](Self::context) replaces the stored one at build
    /// time.
    pub fn context_storage(mut self, storage: ContextStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Bounds each attempt to `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Retries a failed call `count` times, pausing `interval` before each retry.
    pub fn retry(mut self, count: usize, interval: Duration) -> Self {
        self.retry = Some((count, interval));
        self
    }

    /// Connects through `strategy` before each attempt.
    pub fn connect(mut self, strategy: ConnectStrategy) -> Self {
        self.connect = Some(strategy);
        self
    }

    /// Adds the retry handlers of `strategy` to failover.
    pub fn failover(mut self, strategy: FailoverStrategy) -> Self {
        self.failover = Some(strategy);
        self
    }

    /// Replaces the converter applied to unrecovered failures.
    pub fn exception_converter<C>(mut self, converter: C) -> Self
    where
        C: ExceptionConverter + 'static,
    {
        self.converter = Arc::new(converter);
        self
    }

    /// Registers a callback when a request succeeds on its first attempt.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RequestEvent::Success { duration, .. } = event {
                f(*duration);
            }
        }));
        self
    }

    /// Registers a callback when failover recovers a request.
    pub fn on_recovered<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RequestEvent::Recovered { duration, .. } = event {
                f(*duration);
            }
        }));
        self
    }

    /// Registers a callback when a request fails.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(ErrorKind, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RequestEvent::Error { kind, duration, .. } = event {
                f(*kind, *duration);
            }
        }));
        self
    }

    /// Builds the requester.
    ///
    /// Fails with [`CoreError::InvalidArgument`] for a zero timeout or a zero
    /// retry count.
    pub fn build(self) -> Result<Requester, CoreError> {
        let mut strategies: Vec<Strategy> = Vec::new();
        if let Some(timeout) = self.timeout {
            strategies.push(TimeoutStrategy::new(timeout)?.into());
        }
        if let Some((count, interval)) = self.retry {
            strategies.push(RetryStrategy::new(count, interval)?.into());
        }
        if let Some(connect) = self.connect {
            strategies.push(connect.into());
        }
        if let Some(failover) = self.failover {
            strategies.push(failover.into());
        }

        let storage = self.storage.unwrap_or_default();
        if let Some(context) = self.context {
            storage.set(context);
        }
        if !strategies.is_empty() {
            storage.update(|current| {
                strategies
                    .into_iter()
                    .fold(current.clone(), |context, strategy| context.with_strategy(strategy))
            });
        }

        Ok(Requester::new(RequesterConfig {
            name: self.name,
            storage,
            converter: self.converter,
            event_listeners: self.event_listeners,
        }))
    }
}
