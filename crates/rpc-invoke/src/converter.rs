//! Classification of raw failures into [`RpcError`].

use crate::error::{ErrorKind, RpcError};
use rpc_invoke_core::{BoxError, CoreError};
use std::error::Error;
use std::io;

/// Total mapping from any failure to the caller-facing error.
pub trait ExceptionConverter: Send + Sync {
    /// Converts `error`, keeping it as the cause.
    fn convert(&self, error: BoxError) -> RpcError;
}

impl<F> ExceptionConverter for F
where
    F: Fn(BoxError) -> RpcError + Send + Sync,
{
    fn convert(&self, error: BoxError) -> RpcError {
        self(error)
    }
}

/// The default converter.
///
/// An [`RpcError`] passes through untouched and core failures map to their
/// matching [`ErrorKind`]. An `io::Error` of kind `TimedOut` is a timeout;
/// everything else is a transport error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportExceptionConverter;

impl ExceptionConverter for TransportExceptionConverter {
    fn convert(&self, error: BoxError) -> RpcError {
        let error = match error.downcast::<RpcError>() {
            Ok(rpc) => return *rpc,
            Err(other) => other,
        };
        let kind = classify(error.as_ref());
        RpcError::with_source(kind, error)
    }
}

fn classify(error: &(dyn Error + Send + Sync + 'static)) -> ErrorKind {
    if let Some(core) = error.downcast_ref::<CoreError>() {
        return match core {
            CoreError::Timeout { .. } => ErrorKind::Timeout,
            CoreError::NoSuccessHandler => ErrorKind::Conversion,
            CoreError::Configuration(_) => ErrorKind::Configuration,
            CoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CoreError::Cancelled => ErrorKind::Cancelled,
            CoreError::Connect { .. } => ErrorKind::Transport,
            CoreError::Failed(cause) => classify(cause.as_ref()),
        };
    }
    if let Some(rpc) = error.downcast_ref::<RpcError>() {
        return rpc.kind();
    }
    match error.downcast_ref::<io::Error>() {
        Some(io) if io.kind() == io::ErrorKind::TimedOut => ErrorKind::Timeout,
        _ => ErrorKind::Transport,
    }
}
