use crate::backoff::{ExponentialBackoff, FixedInterval, IntervalFunction};
use crate::events::FailoverEvent;
use rpc_invoke_core::events::{EventListeners, FnListener};
use rpc_invoke_core::{ContextHolder, CoreError, Invocation, Response, RetryPolicy};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::debug;

/// A policy that inspects a failed [`Response`] and may produce a new one.
///
/// Handlers never fail themselves: whatever goes wrong while recovering is
/// reported as a failing `Response`.
pub trait FailoverHandler<T>: Send + Sync + fmt::Debug {
    /// Position in a [`FailoverHandlerChain`](crate::FailoverHandlerChain); lower runs first.
    fn priority(&self) -> i32;

    /// Tries to turn `response` into a successful one.
    ///
    /// A successful `response` must be returned unchanged.
    fn handle(&self, invocation: &Invocation<T>, response: Response<T>) -> Response<T>;
}

/// Re-invokes a failed call a fixed number of times.
///
/// Each pass sleeps for the next interval, calls the invocation again and
/// stops as soon as the call succeeds or the countdown reaches zero. The sleep
/// blocks the calling thread.
#[derive(Debug, Clone)]
pub struct JustRetryFailoverHandler {
    count: usize,
    interval: Arc<dyn IntervalFunction>,
    priority: i32,
    name: String,
    event_listeners: EventListeners<FailoverEvent>,
}

impl JustRetryFailoverHandler {
    /// Starts building a handler.
    pub fn builder() -> JustRetryFailoverHandlerBuilder {
        JustRetryFailoverHandlerBuilder::new()
    }

    /// Creates a handler from a validated policy.
    pub fn from_policy(policy: &RetryPolicy) -> Self {
        let interval: Arc<dyn IntervalFunction> = if policy.multiplier() == 1.0 {
            Arc::new(FixedInterval::new(policy.interval()))
        } else {
            let backoff = ExponentialBackoff::new(policy.interval()).multiplier(policy.multiplier());
            match policy.max_interval_cap() {
                Some(max) => Arc::new(backoff.max_interval(max)),
                None => Arc::new(backoff),
            }
        };

        describe_metrics();

        Self {
            count: policy.count(),
            interval,
            priority: policy.handler_priority(),
            name: "just-retry".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Number of retries.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Name used in events and logs.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&RetryPolicy> for JustRetryFailoverHandler {
    fn from(policy: &RetryPolicy) -> Self {
        Self::from_policy(policy)
    }
}

impl<T> FailoverHandler<T> for JustRetryFailoverHandler {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn handle(&self, invocation: &Invocation<T>, response: Response<T>) -> Response<T> {
        if response.is_success() {
            return response;
        }

        let scope = ContextHolder::get()
            .map(|context| context.scope().to_string())
            .unwrap_or_else(|| invocation.name().to_string());

        let mut response = response;
        let mut countdown = self.count;
        let mut attempts = 0;

        while response.is_failure() && countdown > 0 {
            let delay = self.interval.next_interval(attempts);
            attempts += 1;
            countdown -= 1;

            #[cfg(feature = "tracing")]
            debug!(
                handler = %self.name,
                scope = %scope,
                attempt = attempts,
                countdown = countdown,
                interval = ?delay,
                "retrying failed invocation"
            );
            #[cfg(feature = "metrics")]
            counter!("failover_retries_total", "scope" => scope.clone()).increment(1);

            self.event_listeners.emit(&FailoverEvent::Retry {
                scope: scope.clone(),
                timestamp: Instant::now(),
                attempt: attempts,
                delay,
            });

            if !delay.is_zero() {
                std::thread::sleep(delay);
            }

            response = match catch_unwind(AssertUnwindSafe(|| invocation.invoke())) {
                Ok(result) => Response::from(result),
                Err(_panic) => Response::failure(format!("invocation {} panicked", invocation.name())),
            };
        }

        if response.is_success() {
            #[cfg(feature = "metrics")]
            counter!("failover_calls_total", "scope" => scope.clone(), "result" => "success")
                .increment(1);

            self.event_listeners.emit(&FailoverEvent::Success {
                scope,
                timestamp: Instant::now(),
                attempts,
            });
        } else {
            #[cfg(feature = "tracing")]
            debug!(handler = %self.name, scope = %scope, attempts, "retries exhausted");
            #[cfg(feature = "metrics")]
            counter!("failover_calls_total", "scope" => scope.clone(), "result" => "exhausted")
                .increment(1);

            self.event_listeners.emit(&FailoverEvent::Exhausted {
                scope,
                timestamp: Instant::now(),
                attempts,
            });
        }

        response
    }
}

/// Builder for [`JustRetryFailoverHandler`].
pub struct JustRetryFailoverHandlerBuilder {
    count: usize,
    interval: Arc<dyn IntervalFunction>,
    priority: i32,
    name: String,
    event_listeners: EventListeners<FailoverEvent>,
}

impl Default for JustRetryFailoverHandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JustRetryFailoverHandlerBuilder {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - count: 3
    /// - interval: fixed, zero
    /// - priority: 2
    /// - name: `"just-retry"`
    pub fn new() -> Self {
        Self {
            count: 3,
            interval: Arc::new(FixedInterval::new(Duration::ZERO)),
            priority: RetryPolicy::DEFAULT_PRIORITY,
            name: "just-retry".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the number of retries made after the first failure.
    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Sets a fixed pause before each retry.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Arc::new(FixedInterval::new(interval));
        self
    }

    /// Sets a custom interval function.
    pub fn backoff<I>(mut self, interval: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.interval = Arc::new(interval);
        self
    }

    /// Sets the chain priority; lower runs first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the name used in events and logs.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked before each retry with the 1-based attempt
    /// number and the pause about to be taken.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FailoverEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback invoked when a retry recovers the call, with the
    /// number of retries it took.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FailoverEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when every retry failed.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FailoverEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Builds the handler. A zero count is rejected.
    pub fn build(self) -> Result<JustRetryFailoverHandler, CoreError> {
        if self.count == 0 {
            return Err(CoreError::InvalidArgument(
                "retry count must be positive".to_string(),
            ));
        }

        describe_metrics();

        Ok(JustRetryFailoverHandler {
            count: self.count,
            interval: self.interval,
            priority: self.priority,
            name: self.name,
            event_listeners: self.event_listeners,
        })
    }
}

fn describe_metrics() {
    #[cfg(feature = "metrics")]
    {
        describe_counter!(
            "failover_retries_total",
            "Total number of retries made by failover handlers"
        );
        describe_counter!(
            "failover_calls_total",
            "Total number of failed calls handled by failover handlers, by result"
        );
    }
}
