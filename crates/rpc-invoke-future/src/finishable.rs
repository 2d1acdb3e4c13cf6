use parking_lot::{Condvar, Mutex};
use rpc_invoke_core::{BoxError, CoreError};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

enum State<T> {
    Pending,
    Succeeded(T),
    Failed(CoreError),
}

impl<T> State<T> {
    fn is_pending(&self) -> bool {
        matches!(self, State::Pending)
    }
}

struct Shared<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

/// A single-assignment result cell with blocking readers.
///
/// The first call to [`success`](Self::success), [`fail`](Self::fail) or
/// [`cancel`](Self::cancel) decides the outcome; every later write is ignored.
/// Clones share the same cell, so one clone can be handed to the completing
/// side while others wait.
pub struct FinishableFuture<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for FinishableFuture<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for FinishableFuture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FinishableFuture<T> {
    /// Creates a pending future.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::Pending),
                ready: Condvar::new(),
            }),
        }
    }

    /// Completes the future with `value`.
    ///
    /// Returns `false`, leaving the stored outcome untouched, if the future
    /// was already complete.
    pub fn success(&self, value: T) -> bool {
        self.complete(State::Succeeded(value))
    }

    /// Completes the future with `error`.
    ///
    /// A [`CoreError`] is stored as is so readers can still match on it; any
    /// other error is wrapped in [`CoreError::Failed`]. Returns `false` if the
    /// future was already complete.
    pub fn fail(&self, error: impl Into<BoxError>) -> bool {
        let error = match error.into().downcast::<CoreError>() {
            Ok(core) => *core,
            Err(other) => CoreError::Failed(Arc::from(other)),
        };
        self.complete(State::Failed(error))
    }

    /// Completes the future with [`CoreError::Cancelled`].
    pub fn cancel(&self) -> bool {
        self.complete(State::Failed(CoreError::Cancelled))
    }

    /// Returns `true` once an outcome has been stored.
    pub fn is_done(&self) -> bool {
        !self.shared.state.lock().is_pending()
    }

    fn complete(&self, outcome: State<T>) -> bool {
        let mut state = self.shared.state.lock();
        if !state.is_pending() {
            return false;
        }
        *state = outcome;
        drop(state);
        self.shared.ready.notify_all();
        true
    }
}

impl<T: Clone> FinishableFuture<T> {
    /// Blocks until the future completes, then returns its outcome.
    pub fn get(&self) -> Result<T, CoreError> {
        let mut state = self.shared.state.lock();
        while state.is_pending() {
            self.shared.ready.wait(&mut state);
        }
        Self::read(&state)
    }

    /// Blocks for at most `timeout`.
    ///
    /// Returns [`CoreError::Timeout`] if the future is still pending when the
    /// timeout elapses; the future itself stays pending.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, CoreError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.get();
        };
        let mut state = self.shared.state.lock();
        while state.is_pending() {
            if self.shared.ready.wait_until(&mut state, deadline).timed_out() {
                if state.is_pending() {
                    return Err(CoreError::Timeout { after: timeout });
                }
                break;
            }
        }
        Self::read(&state)
    }

    /// Returns the outcome if the future has completed, without blocking.
    pub fn try_get(&self) -> Option<Result<T, CoreError>> {
        let state = self.shared.state.lock();
        if state.is_pending() {
            None
        } else {
            Some(Self::read(&state))
        }
    }

    fn read(state: &State<T>) -> Result<T, CoreError> {
        match state {
            State::Succeeded(value) => Ok(value.clone()),
            State::Failed(error) => Err(error.clone()),
            // Callers only read after observing a terminal state.
            State::Pending => Err(CoreError::Configuration(
                "future read before completion".to_string(),
            )),
        }
    }
}

impl<T> fmt::Debug for FinishableFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.shared.state.lock() {
            State::Pending => "pending",
            State::Succeeded(_) => "succeeded",
            State::Failed(_) => "failed",
        };
        f.debug_struct("FinishableFuture")
            .field("state", &state)
            .finish()
    }
}
