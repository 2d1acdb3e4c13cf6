//! Event system for the invocation core.
//!
//! Failover handlers and the requester report what they did through events so
//! callers can observe retries and outcomes without touching the call path.

use std::fmt;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Trait for events emitted while executing invocations.
pub trait InvocationEvent: Send + Sync + fmt::Debug {
    /// Returns the type of event (e.g., "retry", "recovered").
    fn event_type(&self) -> &'static str;

    /// Returns when this event occurred.
    fn timestamp(&self) -> Instant;

    /// Returns the context scope (usually the invocation name) the event belongs to.
    fn scope(&self) -> &str;
}

/// Trait for listening to invocation events.
pub trait EventListener<E: InvocationEvent>: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &E);
}

/// A cloneable, ordered collection of event listeners.
#[derive(Clone)]
pub struct EventListeners<E: InvocationEvent> {
    listeners: Vec<Arc<dyn EventListener<E>>>,
}

impl<E: InvocationEvent> EventListeners<E> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Appends a listener.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// A panicking listener is isolated: the remaining listeners still run and
    /// the caller never observes the panic.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let _ = catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
        }
    }

    /// Returns true if there are no listeners.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns the number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: InvocationEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: InvocationEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// An event listener backed by a closure.
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Wraps `f` as a listener.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: InvocationEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
