//! Pauses between retries.

use std::fmt;
use std::time::Duration;

/// Computes the pause before a retry.
pub trait IntervalFunction: Send + Sync + fmt::Debug {
    /// The pause before retry number `attempt` (0-based).
    fn next_interval(&self, attempt: usize) -> Duration;
}

/// The same pause before every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    /// Creates a fixed interval.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _attempt: usize) -> Duration {
        self.interval
    }
}

/// A pause that grows geometrically with each retry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    multiplier: f64,
    max_interval: Option<Duration>,
}

impl ExponentialBackoff {
    /// Creates a backoff starting at `initial_interval` and doubling.
    pub fn new(initial_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            max_interval: None,
        }
    }

    /// Sets the growth factor.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Caps the pause.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let nanos = self.initial_interval.as_nanos() as f64 * self.multiplier.powi(exponent);
        let interval = if nanos.is_finite() && nanos < u64::MAX as f64 {
            Duration::from_nanos(nanos as u64)
        } else {
            Duration::MAX
        };
        match self.max_interval {
            Some(max) => interval.min(max),
            None => interval,
        }
    }
}
