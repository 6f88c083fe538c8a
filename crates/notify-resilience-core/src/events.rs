//! Callbacks for observing the delivery decorators.
//!
//! Each decorator defines its own event enum (permit granted, provider
//! switched, job enqueued, ...) and keeps an [`Observers`] list of closures
//! registered through its builder's `on_*` methods. Decorators know nothing
//! about the logging or metrics backend behind a callback.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// The callbacks registered for one decorator instance.
///
/// Clones share the registered closures.
pub struct Observers<E> {
    callbacks: Vec<Callback<E>>,
}

impl<E> Observers<E> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Registers a callback.
    pub fn push<F>(&mut self, callback: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
    }

    /// Hands `event` to every callback in registration order.
    ///
    /// A panicking callback is skipped over; the rest still run and the send
    /// path never sees the panic.
    pub fn notify(&self, event: &E) {
        for callback in &self.callbacks {
            let _ = catch_unwind(AssertUnwindSafe(|| callback(event)));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl<E> Clone for Observers<E> {
    fn clone(&self) -> Self {
        Self {
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
