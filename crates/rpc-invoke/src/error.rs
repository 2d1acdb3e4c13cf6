//! The caller-facing error.

use rpc_invoke_core::BoxError;
use std::error::Error;
use std::fmt;

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The transport or the remote side failed.
    Transport,
    /// A bounded wait elapsed.
    Timeout,
    /// An asynchronous result could not be converted.
    Conversion,
    /// A required context or strategy is missing or invalid.
    Configuration,
    /// The caller passed an argument that cannot be accepted.
    InvalidArgument,
    /// The request was cancelled before completing.
    Cancelled,
}

impl ErrorKind {
    /// Lower-case name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Conversion => "conversion",
            ErrorKind::Configuration => "configuration",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error a request returns when it could not produce a value.
///
/// The original failure is kept as the [`source`](Error::source).
///
/// ```rust
/// use rpc_invoke::{ErrorKind, RpcError};
///
/// let err = RpcError::with_source(ErrorKind::Transport, std::io::Error::other("reset by peer"));
/// assert!(err.is_transport());
/// assert_eq!(err.to_string(), "transport error: reset by peer");
/// ```
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct RpcError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl RpcError {
    /// Creates an error without an underlying cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error preserving `source`; the message is taken from it.
    pub fn with_source(kind: ErrorKind, source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self {
            kind,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// The category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message describing the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The preserved cause, if any.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Returns `true` if the transport or remote side failed.
    pub fn is_transport(&self) -> bool {
        self.kind == ErrorKind::Transport
    }

    /// Returns `true` if a bounded wait elapsed.
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    /// Returns `true` if a result could not be converted.
    pub fn is_conversion(&self) -> bool {
        self.kind == ErrorKind::Conversion
    }

    /// Returns `true` if the configuration was missing or invalid.
    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }

    /// Returns `true` if the caller passed an invalid argument.
    pub fn is_invalid_argument(&self) -> bool {
        self.kind == ErrorKind::InvalidArgument
    }

    /// Returns `true` if the request was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }
}
