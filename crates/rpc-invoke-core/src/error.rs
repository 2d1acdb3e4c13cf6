//! Error vocabulary shared by every rpc-invoke crate.
//!
//! Transport failures are opaque to the core: an [`Invocation`](crate::Invocation)
//! reports them as a [`BoxError`], and they travel untouched through the failover
//! machinery until a caller-facing converter classifies them. Failures the core
//! raises on its own behalf are [`CoreError`] values, boxed into the same channel
//! so they can be recognized again by downcasting.
//!
//! ```rust
//! use rpc_invoke_core::{BoxError, CoreError};
//! use std::time::Duration;
//!
//! let err: BoxError = CoreError::Timeout { after: Duration::from_millis(50) }.into();
//! let core = err.downcast_ref::<CoreError>().unwrap();
//! assert!(core.is_timeout());
//! ```

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// The raw failure type produced by an invocation attempt.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// A failure that may be observed by more than one reader.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Failures raised by the invocation core itself.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    /// A bounded wait elapsed before completion.
    #[error("timed out after {after:?}")]
    Timeout {
        /// The bound that elapsed.
        after: Duration,
    },

    /// An async result arrived but no success handler was registered to convert it.
    #[error("no success handler registered for async result")]
    NoSuccessHandler,

    /// A required context or strategy is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A constructor or call received an argument it cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The connection strategy could not establish a connection.
    #[error("failed to connect to {endpoint} after {attempts} attempt(s)")]
    Connect {
        /// Endpoint the connector was asked to reach.
        endpoint: String,
        /// Number of connection attempts made.
        attempts: usize,
        /// The last connector failure.
        #[source]
        source: SharedError,
    },

    /// A future was completed with a failure.
    #[error("completed with failure: {0}")]
    Failed(#[source] SharedError),

    /// The pending operation was cancelled before it completed.
    #[error("cancelled before completion")]
    Cancelled,
}

impl CoreError {
    /// Wraps an arbitrary failure so it can be shared between readers.
    pub fn failed(error: impl Into<BoxError>) -> Self {
        CoreError::Failed(Arc::from(error.into()))
    }

    /// Returns `true` if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::Timeout { .. })
    }

    /// Returns `true` if this is a missing success handler error.
    pub fn is_no_success_handler(&self) -> bool {
        matches!(self, CoreError::NoSuccessHandler)
    }

    /// Returns `true` if the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }

    /// Returns the failure stored by [`CoreError::Failed`], if any.
    pub fn failure(&self) -> Option<&SharedError> {
        match self {
            CoreError::Failed(cause) => Some(cause),
            _ => None,
        }
    }
}
