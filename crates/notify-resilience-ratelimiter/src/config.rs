use crate::events::RateLimiterEvent;
use crate::limiter::{Limiter, SlidingWindowLimiter};
use notify_resilience_core::{Observers};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the rate limiting decorator.
pub struct RateLimiterConfig {
    pub(crate) limiter: Arc<dyn Limiter>,
    pub(crate) key: String,
    pub(crate) observers: Observers<RateLimiterEvent>,
    pub(crate) name: String,
}

impl RateLimiterConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }

    /// The key every call is counted under.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Builder for [`RateLimiterConfig`].
pub struct RateLimiterConfigBuilder {
    limiter: Option<Arc<dyn Limiter>>,
    key: String,
    observers: Observers<RateLimiterEvent>,
    name: String,
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - limiter: [`SlidingWindowLimiter`] allowing 1000 calls per second
    /// - key: `"sms_ratelimit"`
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            limiter: None,
            key: "sms_ratelimit".to_string(),
            observers: Observers::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the limiter consulted before every send.
    ///
    /// The limiter is shared: every sender produced by the resulting layer
    /// counts against the same windows.
    pub fn limiter<L>(mut self, limiter: L) -> Self
    where
        L: Limiter + 'static,
    {
        self.limiter = Some(Arc::new(limiter));
        self
    }

    /// Sets the key calls are counted under.
    pub fn key<K: Into<String>>(mut self, key: K) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the name used in metric labels and log fields.
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a call is admitted.
    pub fn on_permitted<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if matches!(event, RateLimiterEvent::Permitted) {
                f();
            }
        });
        self
    }

    /// Registers a callback when a call is rejected.
    ///
    /// # Callback Signature
    /// `Fn(bool)` - `true` when the rejection was caused by the limiter
    /// failing rather than by the limit being reached.
    ///
    /// # Example
    /// ```rust
    /// use notify_resilience_ratelimiter::RateLimiterLayer;
    ///
    /// let layer = RateLimiterLayer::builder()
    ///     .on_rejected(|limiter_error| {
    ///         if limiter_error {
    ///             eprintln!("limiter unavailable, failing closed");
    ///         }
    ///     })
    ///     .build();
    /// ```
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let RateLimiterEvent::Rejected { limiter_error, .. } = event {
                f(*limiter_error);
            }
        });
        self
    }

    /// Builds the rate limiter layer.
    pub fn build(self) -> crate::RateLimiterLayer {
        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(SlidingWindowLimiter::new(Duration::from_secs(1), 1000)));

        let config = RateLimiterConfig {
            limiter,
            key: self.key,
            observers: self.observers,
            name: self.name,
        };

        crate::RateLimiterLayer::new(config)
    }
}
