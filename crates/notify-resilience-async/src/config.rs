use crate::events::{AsyncEvent, ConsumerEvent, EnqueueReason};
use notify_resilience_core::{Observers, SendError};
use notify_resilience_queue::JobStore;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the async delivery decorator.
pub struct AsyncSenderConfig {
    pub(crate) latency_threshold: Duration,
    pub(crate) window_capacity: usize,
    pub(crate) retry_max: u32,
    pub(crate) observers: Observers<AsyncEvent>,
    pub(crate) name: String,
}

impl AsyncSenderConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AsyncSenderConfigBuilder {
        AsyncSenderConfigBuilder::new()
    }

    /// Mean latency at or above which sends are moved to the queue.
    pub fn latency_threshold(&self) -> Duration {
        self.latency_threshold
    }

    /// Number of recent sends the mean is taken over.
    pub fn window_capacity(&self) -> usize {
        self.window_capacity
    }

    /// Attempts a queued job is allowed before it is marked failed.
    pub fn retry_max(&self) -> u32 {
        self.retry_max
    }
}

/// Builder for [`AsyncSenderConfig`].
pub struct AsyncSenderConfigBuilder {
    latency_threshold: Duration,
    window_capacity: usize,
    retry_max: u32,
    observers: Observers<AsyncEvent>,
    name: String,
}

impl Default for AsyncSenderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncSenderConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - latency_threshold: 500ms
    /// - window_capacity: 3
    /// - retry_max: 3
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            latency_threshold: Duration::from_millis(500),
            window_capacity: 3,
            retry_max: 3,
            observers: Observers::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the mean latency that shifts traffic to the queue.
    pub fn latency_threshold(mut self, threshold: Duration) -> Self {
        self.latency_threshold = threshold;
        self
    }

    /// Sets how many recent sends are averaged.
    pub fn window_capacity(mut self, capacity: usize) -> Self {
        self.window_capacity = capacity;
        self
    }

    /// Sets the attempt budget for queued jobs.
    pub fn retry_max(mut self, retry_max: u32) -> Self {
        self.retry_max = retry_max;
        self
    }

    /// Sets the name used in metric labels and log fields.
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a send is converted into a queued job.
    ///
    /// # Callback Signature
    /// `Fn(EnqueueReason, i64)` - why the send was queued and the job id.
    pub fn on_enqueued<F>(mut self, f: F) -> Self
    where
        F: Fn(EnqueueReason, i64) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let AsyncEvent::Enqueued { reason, job_id, .. } = event {
                f(*reason, *job_id);
            }
        });
        self
    }

    /// Registers a callback when the inner outcome is returned unchanged.
    ///
    /// # Callback Signature
    /// `Fn(Duration)` - how long the inner send took.
    pub fn on_passthrough<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let AsyncEvent::Passthrough { duration, .. } = event {
                f(*duration);
            }
        });
        self
    }

    /// Builds the layer, enqueueing into `store`.
    pub fn build<J>(self, store: J) -> crate::AsyncLayer
    where
        J: JobStore + 'static,
    {
        let config = AsyncSenderConfig {
            latency_threshold: self.latency_threshold,
            window_capacity: self.window_capacity,
            retry_max: self.retry_max,
            observers: self.observers,
            name: self.name,
        };

        crate::AsyncLayer::new(config, Arc::new(store))
    }
}

/// Configuration for the background [`Consumer`](crate::Consumer).
pub struct ConsumerConfig {
    pub(crate) startup_delay: Duration,
    pub(crate) backoff_window: Duration,
    pub(crate) idle_backoff: Duration,
    pub(crate) claim_timeout: Duration,
    pub(crate) send_timeout: Duration,
    pub(crate) observers: Observers<ConsumerEvent>,
    pub(crate) name: String,
}

impl ConsumerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ConsumerConfigBuilder {
        ConsumerConfigBuilder::new()
    }

    /// How long a claimed or failed job stays invisible to other claims.
    pub fn backoff_window(&self) -> Duration {
        self.backoff_window
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        ConsumerConfigBuilder::new().build()
    }
}

/// Builder for [`ConsumerConfig`].
pub struct ConsumerConfigBuilder {
    startup_delay: Duration,
    backoff_window: Duration,
    idle_backoff: Duration,
    claim_timeout: Duration,
    send_timeout: Duration,
    observers: Observers<ConsumerEvent>,
    name: String,
}

impl Default for ConsumerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsumerConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - startup_delay: 3s
    /// - backoff_window: 60s
    /// - idle_backoff: 5s
    /// - claim_timeout: 1s
    /// - send_timeout: 1s
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            startup_delay: Duration::from_secs(3),
            backoff_window: Duration::from_secs(60),
            idle_backoff: Duration::from_secs(5),
            claim_timeout: Duration::from_secs(1),
            send_timeout: Duration::from_secs(1),
            observers: Observers::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the delay before the first claim.
    pub fn startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Sets how long a job must sit untouched before it can be claimed.
    ///
    /// This is both the lease on a claimed job and the retry interval of a
    /// failed one.
    pub fn backoff_window(mut self, window: Duration) -> Self {
        self.backoff_window = window;
        self
    }

    /// Sets the sleep after an empty or failed claim.
    pub fn idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff = backoff;
        self
    }

    /// Sets the deadline for a single claim query.
    pub fn claim_timeout(mut self, timeout: Duration) -> Self {
        self.claim_timeout = timeout;
        self
    }

    /// Sets the deadline for delivering a claimed job.
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Sets the name used in metric labels and log fields.
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a queued job is delivered.
    pub fn on_delivered<F>(mut self, f: F) -> Self
    where
        F: Fn(i64) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let ConsumerEvent::Delivered { job_id, .. } = event {
                f(*job_id);
            }
        });
        self
    }

    /// Registers a callback when a delivery attempt fails.
    ///
    /// # Callback Signature
    /// `Fn(i64, &SendError, bool)` - the job id, the failure, and whether the
    /// job has now been marked failed for good.
    pub fn on_attempt_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(i64, &SendError, bool) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let ConsumerEvent::AttemptFailed {
                job_id,
                error,
                exhausted,
                ..
            } = event
            {
                f(*job_id, error, *exhausted);
            }
        });
        self
    }

    /// Registers a callback when a claim finds nothing to do.
    pub fn on_idle<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if matches!(event, ConsumerEvent::Idle) {
                f();
            }
        });
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ConsumerConfig {
        ConsumerConfig {
            startup_delay: self.startup_delay,
            backoff_window: self.backoff_window,
            idle_backoff: self.idle_backoff,
            claim_timeout: self.claim_timeout,
            send_timeout: self.send_timeout,
            observers: self.observers,
            name: self.name,
        }
    }
}
