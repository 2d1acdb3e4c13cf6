use crate::handler::{FailoverHandler, JustRetryFailoverHandler};
use rpc_invoke_core::{Context, Invocation, Response};
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// Priority-ordered failover handlers.
///
/// Handlers are stable-sorted by ascending priority once, when the chain is
/// built; handlers sharing a priority keep the order they were supplied in.
pub struct FailoverHandlerChain<T> {
    handlers: Vec<Arc<dyn FailoverHandler<T>>>,
}

impl<T> Clone for FailoverHandlerChain<T> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<T> Default for FailoverHandlerChain<T> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<T> FailoverHandlerChain<T> {
    /// Builds a chain from an unordered collection of handlers.
    pub fn new(handlers: impl IntoIterator<Item = Arc<dyn FailoverHandler<T>>>) -> Self {
        let mut handlers: Vec<_> = handlers.into_iter().collect();
        handlers.sort_by_key(|handler| handler.priority());

        #[cfg(feature = "tracing")]
        trace!(
            priorities = ?handlers.iter().map(|h| h.priority()).collect::<Vec<_>>(),
            "failover handlers ordered"
        );

        Self { handlers }
    }

    /// Passes `response` through the handlers while it carries a failure.
    ///
    /// Stops at the first successful response and returns whatever the last
    /// handler produced. An empty chain returns `response` as is.
    pub fn handle(&self, invocation: &Invocation<T>, response: Response<T>) -> Response<T> {
        let mut response = response;
        for handler in &self.handlers {
            if response.is_success() {
                break;
            }

            #[cfg(feature = "tracing")]
            debug!(
                invocation = %invocation.name(),
                priority = handler.priority(),
                "failover handler invoked"
            );

            response = handler.handle(invocation, response);
        }
        response
    }

    /// Handler priorities in execution order.
    pub fn priorities(&self) -> Vec<i32> {
        self.handlers.iter().map(|handler| handler.priority()).collect()
    }

    /// Returns true if there are no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl<T: 'static> FailoverHandlerChain<T> {
    /// Builds the handlers configured on `context`.
    ///
    /// A retry strategy contributes one fixed-interval handler and a failover
    /// strategy one handler per policy. A context with neither gives an empty
    /// chain.
    pub fn from_context(context: &Context) -> Self {
        let retry = context
            .retry()
            .map(|strategy| JustRetryFailoverHandler::from_policy(&(*strategy).into()));
        let failover = context
            .failover()
            .into_iter()
            .flat_map(|strategy| strategy.policies())
            .map(JustRetryFailoverHandler::from_policy);

        Self::new(
            retry
                .into_iter()
                .chain(failover)
                .map(|handler| Arc::new(handler) as Arc<dyn FailoverHandler<T>>),
        )
    }
}

impl<T> fmt::Debug for FailoverHandlerChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailoverHandlerChain")
            .field("handlers", &self.handlers)
            .finish()
    }
}
