use crate::{ConnectLayer, TimeoutLayer};
use rpc_invoke_core::{Context, Invocation, StrategyKind};
use tower::layer::Layer;

/// The decorating pipeline a context asks for.
///
/// Stages are applied in a fixed order: connect outermost, then timeout, then
/// the raw call. A stage whose strategy is absent from the context is skipped.
#[derive(Debug, Clone, Default)]
pub struct StrategyChain {
    connect: Option<ConnectLayer>,
    timeout: Option<TimeoutLayer>,
}

impl StrategyChain {
    /// Resolves the stages configured on `context`.
    pub fn of(context: &Context) -> Self {
        Self {
            connect: context.connect().cloned().map(ConnectLayer::new),
            timeout: context.timeout().map(TimeoutLayer::new),
        }
    }

    /// Capabilities this chain decorates with, outermost first.
    pub fn stages(&self) -> Vec<StrategyKind> {
        let mut stages = Vec::with_capacity(2);
        if self.connect.is_some() {
            stages.push(StrategyKind::Connect);
        }
        if self.timeout.is_some() {
            stages.push(StrategyKind::Timeout);
        }
        stages
    }

    /// Returns `invocation` wrapped in every configured stage.
    pub fn apply<T>(&self, invocation: Invocation<T>) -> Invocation<T>
    where
        T: Send + 'static,
    {
        let invocation = match &self.timeout {
            Some(timeout) => timeout.layer(invocation),
            None => invocation,
        };
        match &self.connect {
            Some(connect) => connect.layer(invocation),
            None => invocation,
        }
    }
}

impl<T> Layer<Invocation<T>> for StrategyChain
where
    T: Send + 'static,
{
    type Service = Invocation<T>;

    fn layer(&self, invocation: Invocation<T>) -> Self::Service {
        self.apply(invocation)
    }
}
