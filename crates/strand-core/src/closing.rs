//! Teardown callbacks for resources owned by the registry.

use parking_lot::Mutex;
use tracing::{Level, debug, error, span};

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Callbacks executed once when the registry shuts down.
///
/// Modules register teardown for resources they created at build time — a
/// connection pool, a worker, a temp directory. Actions run in registration
/// order; a panicking action is logged and the remaining actions still run.
/// Closing twice is a no-op.
pub struct ClosingActions {
    actions: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

impl ClosingActions {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Registers a teardown callback.
    pub fn register(&self, action: impl FnOnce() + Send + 'static) {
        self.actions.lock().push(Box::new(action));
    }

    /// Returns the number of pending actions.
    pub fn len(&self) -> usize {
        self.actions.lock().len()
    }

    /// Returns whether no action is pending.
    pub fn is_empty(&self) -> bool {
        self.actions.lock().is_empty()
    }

    /// Runs and drains every registered action.
    pub fn close(&self) {
        let actions = std::mem::take(&mut *self.actions.lock());
        if actions.is_empty() {
            return;
        }

        let span = span!(Level::DEBUG, "close");
        let _enter = span.enter();
        debug!(actions = actions.len(), "running closing actions");

        for (index, action) in actions.into_iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(action)).is_err() {
                error!(index, "closing action panicked");
            }
        }
    }
}

impl Default for ClosingActions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClosingActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosingActions")
            .field("pending", &self.len())
            .finish()
    }
}
