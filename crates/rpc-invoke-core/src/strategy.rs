//! Policies a [`Context`](crate::Context) can carry.
//!
//! The set of capabilities is closed: every strategy is one of the
//! [`Strategy`] variants and is looked up by its [`StrategyKind`]. Strategies
//! are immutable once built and validate their arguments at construction.

use crate::error::{BoxError, CoreError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Capability tag used to resolve a strategy from a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Connection establishment before a call.
    Connect,
    /// Bounded call duration.
    Timeout,
    /// Ordered retry handlers applied after a failure.
    Failover,
    /// Fixed-interval retry applied after a failure.
    Retry,
}

impl StrategyKind {
    /// Lower-case name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Connect => "connect",
            StrategyKind::Timeout => "timeout",
            StrategyKind::Failover => "failover",
            StrategyKind::Retry => "retry",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A policy attached to a context.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// See [`ConnectStrategy`].
    Connect(ConnectStrategy),
    /// See [`TimeoutStrategy`].
    Timeout(TimeoutStrategy),
    /// See [`FailoverStrategy`].
    Failover(FailoverStrategy),
    /// See [`RetryStrategy`].
    Retry(RetryStrategy),
}

impl Strategy {
    /// The capability this strategy provides.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Connect(_) => StrategyKind::Connect,
            Strategy::Timeout(_) => StrategyKind::Timeout,
            Strategy::Failover(_) => StrategyKind::Failover,
            Strategy::Retry(_) => StrategyKind::Retry,
        }
    }
}

impl From<ConnectStrategy> for Strategy {
    fn from(strategy: ConnectStrategy) -> Self {
        Strategy::Connect(strategy)
    }
}

impl From<TimeoutStrategy> for Strategy {
    fn from(strategy: TimeoutStrategy) -> Self {
        Strategy::Timeout(strategy)
    }
}

impl From<FailoverStrategy> for Strategy {
    fn from(strategy: FailoverStrategy) -> Self {
        Strategy::Failover(strategy)
    }
}

impl From<RetryStrategy> for Strategy {
    fn from(strategy: RetryStrategy) -> Self {
        Strategy::Retry(strategy)
    }
}

/// Bounds the wall-clock duration of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutStrategy {
    timeout: Duration,
}

impl TimeoutStrategy {
    /// Creates a timeout strategy. A zero timeout is rejected.
    pub fn new(timeout: Duration) -> Result<Self, CoreError> {
        if timeout.is_zero() {
            return Err(CoreError::InvalidArgument(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(Self { timeout })
    }

    /// The configured bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Retries a failed call a fixed number of times with a fixed pause in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryStrategy {
    count: usize,
    interval: Duration,
}

impl RetryStrategy {
    /// Creates a retry strategy. `count` must be positive.
    pub fn new(count: usize, interval: Duration) -> Result<Self, CoreError> {
        if count == 0 {
            return Err(CoreError::InvalidArgument(
                "retry count must be positive".to_string(),
            ));
        }
        Ok(Self { count, interval })
    }

    /// Number of retries after the first failure.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Pause before each retry.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Configuration of one retry handler inside a [`FailoverStrategy`].
///
/// The pause before retry `n` (0-based) is `interval * multiplier^n`, capped
/// at `max_interval` when one is set. A multiplier of `1.0` gives a fixed
/// interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    count: usize,
    interval: Duration,
    multiplier: f64,
    max_interval: Option<Duration>,
    priority: i32,
}

impl RetryPolicy {
    /// Priority of a retry handler unless configured otherwise.
    pub const DEFAULT_PRIORITY: i32 = 2;

    /// A fixed-interval policy. `count` must be positive.
    pub fn fixed(count: usize, interval: Duration) -> Result<Self, CoreError> {
        Self::exponential(count, interval, 1.0)
    }

    /// A policy whose interval grows by `multiplier` after each retry.
    pub fn exponential(count: usize, interval: Duration, multiplier: f64) -> Result<Self, CoreError> {
        if count == 0 {
            return Err(CoreError::InvalidArgument(
                "retry count must be positive".to_string(),
            ));
        }
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(CoreError::InvalidArgument(format!(
                "backoff multiplier must be a finite value >= 1.0, got {multiplier}"
            )));
        }
        Ok(Self {
            count,
            interval,
            multiplier,
            max_interval: None,
            priority: Self::DEFAULT_PRIORITY,
        })
    }

    /// Caps the grown interval.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }

    /// Sets the priority; lower runs first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Number of retries.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Pause before the first retry.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Growth factor applied after each retry.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Upper bound on the pause, if any.
    pub fn max_interval_cap(&self) -> Option<Duration> {
        self.max_interval
    }

    /// Handler priority; lower runs first.
    pub fn handler_priority(&self) -> i32 {
        self.priority
    }
}

impl From<RetryStrategy> for RetryPolicy {
    fn from(strategy: RetryStrategy) -> Self {
        RetryPolicy {
            count: strategy.count,
            interval: strategy.interval,
            multiplier: 1.0,
            max_interval: None,
            priority: Self::DEFAULT_PRIORITY,
        }
    }
}

/// An unordered collection of retry handlers applied after a failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailoverStrategy {
    policies: Vec<RetryPolicy>,
}

impl FailoverStrategy {
    /// Creates a failover strategy from handler policies.
    pub fn new(policies: impl IntoIterator<Item = RetryPolicy>) -> Self {
        Self {
            policies: policies.into_iter().collect(),
        }
    }

    /// Adds another handler policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Handler policies in the order they were supplied.
    pub fn policies(&self) -> &[RetryPolicy] {
        &self.policies
    }
}

/// Establishes the connection a transport call runs over.
///
/// The core never builds channels itself; it only asks the connector to make
/// sure one is usable before a call goes out.
pub trait Connector: Send + Sync {
    /// Returns `true` if a usable connection already exists.
    fn is_connected(&self) -> bool;

    /// Attempts to connect to `endpoint`.
    fn connect(&self, endpoint: &str) -> Result<(), BoxError>;
}

/// Makes sure a connection exists before each call.
#[derive(Clone)]
pub struct ConnectStrategy {
    endpoint: String,
    connector: Arc<dyn Connector>,
    max_attempts: usize,
    backoff: Duration,
}

impl ConnectStrategy {
    /// Starts building a strategy that connects to `endpoint` through `connector`.
    pub fn builder<C>(endpoint: impl Into<String>, connector: C) -> ConnectStrategyBuilder
    where
        C: Connector + 'static,
    {
        ConnectStrategyBuilder::new(endpoint.into(), Arc::new(connector))
    }

    /// Endpoint passed to the connector.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The connector.
    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    /// Connection attempts made before giving up.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Pause between connection attempts.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

impl fmt::Debug for ConnectStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectStrategy")
            .field("endpoint", &self.endpoint)
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ConnectStrategy`].
pub struct ConnectStrategyBuilder {
    endpoint: String,
    connector: Arc<dyn Connector>,
    max_attempts: usize,
    backoff: Duration,
}

impl ConnectStrategyBuilder {
    /// Creates a builder with default values.
    ///
    /// Defaults:
    /// - max_attempts: 3
    /// - backoff: 100ms
    fn new(endpoint: String, connector: Arc<dyn Connector>) -> Self {
        Self {
            endpoint,
            connector,
            max_attempts: 3,
            backoff: Duration::from_millis(100),
        }
    }

    /// Sets how many connection attempts are made before giving up.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the pause between connection attempts.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Builds the strategy. Zero attempts is rejected.
    pub fn build(self) -> Result<ConnectStrategy, CoreError> {
        if self.max_attempts == 0 {
            return Err(CoreError::InvalidArgument(
                "connect attempts must be positive".to_string(),
            ));
        }
        if self.endpoint.is_empty() {
            return Err(CoreError::InvalidArgument(
                "connect endpoint must not be empty".to_string(),
            ));
        }
        Ok(ConnectStrategy {
            endpoint: self.endpoint,
            connector: self.connector,
            max_attempts: self.max_attempts,
            backoff: self.backoff,
        })
    }
}
