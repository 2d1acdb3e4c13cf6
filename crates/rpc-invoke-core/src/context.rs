//! Per-call configuration and its thread-scoped propagation.
//!
//! A [`Context`] is an immutable bundle of a scope name and a set of
//! [`Strategy`] values, at most one per [`StrategyKind`]. Deriving a new scope
//! or adding a strategy always returns a new `Context`; existing values are
//! never modified, so a context can be shared freely between threads.
//!
//! [`ContextHolder`] makes a context visible to code running on the current
//! thread for the duration of one call. Attaching returns a [`ContextGuard`]
//! that restores whatever was attached before, on every exit path including
//! unwinding, so a pooled thread never carries a context into an unrelated call.
//!
//! ```rust
//! use rpc_invoke_core::{Context, ContextHolder, Strategy, TimeoutStrategy};
//! use std::time::Duration;
//!
//! let base = Context::new()
//!     .with_strategy(Strategy::Timeout(TimeoutStrategy::new(Duration::from_secs(3)).unwrap()));
//! let scoped = base.with_scope("getAccountState");
//!
//! assert_eq!(base.scope(), "");
//! assert_eq!(scoped.scope(), "getAccountState");
//! assert!(scoped.timeout().is_some());
//!
//! assert!(ContextHolder::get().is_none());
//! {
//!     let _guard = ContextHolder::attach(scoped);
//!     assert_eq!(ContextHolder::get().unwrap().scope(), "getAccountState");
//! }
//! assert!(ContextHolder::get().is_none());
//! ```

use crate::strategy::{
    ConnectStrategy, FailoverStrategy, RetryStrategy, Strategy, StrategyKind, TimeoutStrategy,
};
use parking_lot::RwLock;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::trace;

/// Immutable per-call configuration: a scope name plus attached strategies.
#[derive(Clone)]
pub struct Context {
    scope: Arc<str>,
    strategies: Arc<[Strategy]>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            scope: Arc::from(""),
            strategies: Arc::from(Vec::new()),
        }
    }
}

impl Context {
    /// Creates an empty context with no scope and no strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active scope name.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns a context identical to this one but scoped to `scope`.
    pub fn with_scope(&self, scope: impl Into<String>) -> Context {
        Context {
            scope: Arc::from(scope.into()),
            strategies: Arc::clone(&self.strategies),
        }
    }

    /// Returns a context with `strategy` attached.
    ///
    /// A strategy of the same kind that was attached earlier is replaced; the
    /// new one takes the last position.
    pub fn with_strategy(&self, strategy: impl Into<Strategy>) -> Context {
        let strategy = strategy.into();
        let kind = strategy.kind();
        let strategies: Vec<Strategy> = self
            .strategies
            .iter()
            .filter(|s| s.kind() != kind)
            .cloned()
            .chain(std::iter::once(strategy))
            .collect();
        Context {
            scope: Arc::clone(&self.scope),
            strategies: Arc::from(strategies),
        }
    }

    /// Resolves the strategy attached for `kind`.
    pub fn get(&self, kind: StrategyKind) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.kind() == kind)
    }

    /// Attached strategies in attachment order.
    pub fn strategies(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.iter()
    }

    /// The connection strategy, if any.
    pub fn connect(&self) -> Option<&ConnectStrategy> {
        match self.get(StrategyKind::Connect) {
            Some(Strategy::Connect(strategy)) => Some(strategy),
            _ => None,
        }
    }

    /// The timeout strategy, if any.
    pub fn timeout(&self) -> Option<&TimeoutStrategy> {
        match self.get(StrategyKind::Timeout) {
            Some(Strategy::Timeout(strategy)) => Some(strategy),
            _ => None,
        }
    }

    /// The failover strategy, if any.
    pub fn failover(&self) -> Option<&FailoverStrategy> {
        match self.get(StrategyKind::Failover) {
            Some(Strategy::Failover(strategy)) => Some(strategy),
            _ => None,
        }
    }

    /// The retry strategy, if any.
    pub fn retry(&self) -> Option<&RetryStrategy> {
        match self.get(StrategyKind::Retry) {
            Some(Strategy::Retry(strategy)) => Some(strategy),
            _ => None,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("scope", &self.scope)
            .field("strategies", &self.strategies)
            .finish()
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Context>> = const { RefCell::new(None) };
}

/// Thread-scoped holder of the context of the call in progress.
pub struct ContextHolder;

impl ContextHolder {
    /// Attaches `context` to the current thread until the returned guard drops.
    #[must_use = "the context is released as soon as the guard is dropped"]
    pub fn attach(context: Context) -> ContextGuard {
        #[cfg(feature = "tracing")]
        trace!(scope = %context.scope(), "attach context");

        let previous = CURRENT.with(|current| current.replace(Some(context)));
        ContextGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    /// The context attached to the current thread, if any.
    pub fn get() -> Option<Context> {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Detaches and returns the context of the current thread.
    ///
    /// An outstanding [`ContextGuard`] still restores its previous value when
    /// it drops.
    pub fn remove() -> Option<Context> {
        CURRENT.with(|current| current.take())
    }

    /// Runs `f` with `context` attached, restoring the previous context afterward.
    pub fn run_with<R>(context: Context, f: impl FnOnce() -> R) -> R {
        let _guard = Self::attach(context);
        f()
    }
}

/// Restores the previously attached context when dropped.
pub struct ContextGuard {
    previous: Option<Context>,
    // The guard must be dropped on the thread that created it.
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let _released = CURRENT.try_with(|current| current.replace(previous));

        #[cfg(feature = "tracing")]
        {
            if let Ok(Some(released)) = &_released {
                trace!(scope = %released.scope(), "release context");
            }
        }
    }
}

impl fmt::Debug for ContextGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextGuard")
            .field("previous", &self.previous)
            .finish()
    }
}

/// Shared, replaceable client-level context.
///
/// A requester resolves its base context here whenever the calling thread has
/// none attached.
#[derive(Clone, Default)]
pub struct ContextStorage {
    inner: Arc<RwLock<Context>>,
}

impl ContextStorage {
    /// Creates storage holding `context`.
    pub fn new(context: Context) -> Self {
        Self {
            inner: Arc::new(RwLock::new(context)),
        }
    }

    /// The stored context.
    pub fn get(&self) -> Context {
        self.inner.read().clone()
    }

    /// Replaces the stored context, returning the previous one.
    pub fn set(&self, context: Context) -> Context {
        std::mem::replace(&mut *self.inner.write(), context)
    }

    /// Replaces the stored context with `f` applied to it.
    pub fn update(&self, f: impl FnOnce(&Context) -> Context) {
        let mut guard = self.inner.write();
        *guard = f(&guard);
    }
}

impl fmt::Debug for ContextStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextStorage")
            .field(&*self.inner.read())
            .finish()
    }
}
