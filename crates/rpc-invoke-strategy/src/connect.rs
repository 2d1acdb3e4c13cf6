//! Connection establishment before a call.

use rpc_invoke_core::{BoxError, ConnectStrategy, CoreError, Invocation};
use std::sync::Arc;
use std::thread;
use tower::layer::Layer;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Layer making sure the connector is connected before each attempt.
#[derive(Debug, Clone)]
pub struct ConnectLayer {
    strategy: ConnectStrategy,
}

impl ConnectLayer {
    /// Creates a layer from a connect strategy.
    pub fn new(strategy: ConnectStrategy) -> Self {
        #[cfg(feature = "metrics")]
        describe_counter!(
            "rpc_connect_attempts_total",
            "Total number of connection attempts by endpoint and result"
        );

        Self { strategy }
    }

    /// The strategy this layer applies.
    pub fn strategy(&self) -> &ConnectStrategy {
        &self.strategy
    }

    /// Connects unless a usable connection already exists.
    ///
    /// Makes up to `max_attempts` attempts with `backoff` in between and fails
    /// with [`CoreError::Connect`] carrying the last connector error.
    pub fn ensure_connected(&self) -> Result<(), CoreError> {
        let connector = self.strategy.connector();
        if connector.is_connected() {
            return Ok(());
        }

        let endpoint = self.strategy.endpoint();
        let max_attempts = self.strategy.max_attempts();
        let mut last_error: BoxError = "not connected".into();

        for attempt in 1..=max_attempts {
            #[cfg(feature = "tracing")]
            debug!(endpoint = %endpoint, attempt, max_attempts, "connecting");

            match connector.connect(endpoint) {
                Ok(()) => {
                    #[cfg(feature = "metrics")]
                    counter!("rpc_connect_attempts_total", "endpoint" => endpoint.to_string(), "result" => "success")
                        .increment(1);
                    return Ok(());
                }
                Err(error) => {
                    #[cfg(feature = "metrics")]
                    counter!("rpc_connect_attempts_total", "endpoint" => endpoint.to_string(), "result" => "error")
                        .increment(1);
                    last_error = error;
                }
            }

            if attempt < max_attempts && !self.strategy.backoff().is_zero() {
                thread::sleep(self.strategy.backoff());
            }
        }

        #[cfg(feature = "tracing")]
        warn!(endpoint = %endpoint, attempts = max_attempts, error = %last_error, "giving up connecting");

        Err(CoreError::Connect {
            endpoint: endpoint.to_string(),
            attempts: max_attempts,
            source: Arc::from(last_error),
        })
    }
}

impl<T> Layer<Invocation<T>> for ConnectLayer
where
    T: 'static,
{
    type Service = Invocation<T>;

    fn layer(&self, invocation: Invocation<T>) -> Self::Service {
        let layer = self.clone();
        invocation.wrap(move |inner| {
            layer.ensure_connected()?;
            inner.invoke()
        })
    }
}
