use crate::error::ErrorKind;
use rpc_invoke_core::InvocationEvent;
use std::time::{Duration, Instant};

/// Events emitted by the requester, one per request.
#[derive(Debug, Clone)]
pub enum RequestEvent {
    /// The first attempt succeeded.
    Success {
        scope: String,
        timestamp: Instant,
        duration: Duration,
    },
    /// The first attempt failed and failover recovered the call.
    Recovered {
        scope: String,
        timestamp: Instant,
        duration: Duration,
    },
    /// The request failed.
    Error {
        scope: String,
        timestamp: Instant,
        duration: Duration,
        kind: ErrorKind,
    },
}

impl InvocationEvent for RequestEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RequestEvent::Success { .. } => "success",
            RequestEvent::Recovered { .. } => "recovered",
            RequestEvent::Error { .. } => "error",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RequestEvent::Success { timestamp, .. }
            | RequestEvent::Recovered { timestamp, .. }
            | RequestEvent::Error { timestamp, .. } => *timestamp,
        }
    }

    fn scope(&self) -> &str {
        match self {
            RequestEvent::Success { scope, .. }
            | RequestEvent::Recovered { scope, .. }
            | RequestEvent::Error { scope, .. } => scope,
        }
    }
}
