use crate::events::{CallOutcome, DeadlineEvent};
use crate::TimeLimitedSender;
use notify_resilience_core::Observers;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

/// Settings shared by every sender one layer produces.
pub(crate) struct Deadline {
    pub(crate) limit: Duration,
    pub(crate) name: String,
    pub(crate) observers: Observers<DeadlineEvent>,
}

/// A Tower [`Layer`] that bounds every provider call with the same deadline.
///
/// Senders built from one layer share its callbacks.
#[derive(Clone)]
pub struct TimeLimiterLayer {
    deadline: Arc<Deadline>,
}

impl TimeLimiterLayer {
    /// A layer with the given deadline and no callbacks.
    pub fn new(limit: Duration) -> Self {
        Self::builder().deadline(limit).build()
    }

    /// Creates a builder.
    pub fn builder() -> TimeLimiterBuilder {
        TimeLimiterBuilder::new()
    }

    /// The deadline applied to every call.
    pub fn deadline(&self) -> Duration {
        self.deadline.limit
    }
}

impl Default for TimeLimiterLayer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl<S> Layer<S> for TimeLimiterLayer {
    type Service = TimeLimitedSender<S>;

    fn layer(&self, sender: S) -> Self::Service {
        TimeLimitedSender::new(sender, Arc::clone(&self.deadline))
    }
}

/// Builder for [`TimeLimiterLayer`].
pub struct TimeLimiterBuilder {
    limit: Duration,
    name: String,
    observers: Observers<DeadlineEvent>,
}

impl TimeLimiterBuilder {
    /// Defaults: a 1s deadline, named `"<unnamed>"`, no callbacks.
    pub fn new() -> Self {
        Self {
            limit: Duration::from_secs(1),
            name: "<unnamed>".to_string(),
            observers: Observers::new(),
        }
    }

    /// How long a provider gets before the call fails with
    /// [`SendError::Timeout`](notify_resilience_core::SendError::Timeout).
    pub fn deadline(mut self, limit: Duration) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the name used in metric labels and log fields.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Called after every call, whatever its outcome.
    pub fn on_call<F>(mut self, f: F) -> Self
    where
        F: Fn(&DeadlineEvent) + Send + Sync + 'static,
    {
        self.observers.push(f);
        self
    }

    /// Called when a call is dropped at the deadline.
    pub fn on_expired<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if event.outcome == CallOutcome::Expired {
                f();
            }
        });
        self
    }

    pub fn build(self) -> TimeLimiterLayer {
        TimeLimiterLayer {
            deadline: Arc::new(Deadline {
                limit: self.limit,
                name: self.name,
                observers: self.observers,
            }),
        }
    }
}

impl Default for TimeLimiterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
