use rpc_invoke_core::InvocationEvent;
use std::time::{Duration, Instant};

/// Events emitted by failover handlers.
#[derive(Debug, Clone)]
pub enum FailoverEvent {
    /// A retry is about to be made after `delay`.
    Retry {
        scope: String,
        timestamp: Instant,
        attempt: usize,
        delay: Duration,
    },
    /// A retry produced a value.
    Success {
        scope: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// Every retry failed.
    Exhausted {
        scope: String,
        timestamp: Instant,
        attempts: usize,
    },
}

impl InvocationEvent for FailoverEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FailoverEvent::Retry { .. } => "retry",
            FailoverEvent::Success { .. } => "success",
            FailoverEvent::Exhausted { .. } => "exhausted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FailoverEvent::Retry { timestamp, .. }
            | FailoverEvent::Success { timestamp, .. }
            | FailoverEvent::Exhausted { timestamp, .. } => *timestamp,
        }
    }

    fn scope(&self) -> &str {
        match self {
            FailoverEvent::Retry { scope, .. }
            | FailoverEvent::Success { scope, .. }
            | FailoverEvent::Exhausted { scope, .. } => scope,
        }
    }
}
