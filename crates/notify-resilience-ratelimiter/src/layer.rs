use crate::{RateLimitedSender, RateLimiterConfig, RateLimiterConfigBuilder};
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that puts a rate limit in front of a sender.
///
/// # Examples
///
/// ```
/// use notify_resilience_ratelimiter::{RateLimiterLayer, SlidingWindowLimiter};
/// use notify_resilience_core::{sender_fn, SendError, SendRequest, Sender};
/// use std::time::Duration;
/// use tower::Layer;
///
/// # async fn example() {
/// let layer = RateLimiterLayer::builder()
///     .limiter(SlidingWindowLimiter::new(Duration::from_secs(1), 100))
///     .build();
///
/// let sender = layer.layer(sender_fn(|_req: SendRequest| async { Ok::<_, SendError>(()) }));
/// sender
///     .send(SendRequest::new("welcome", vec![], vec!["+15550100".into()]))
///     .await
///     .unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct RateLimiterLayer {
    config: Arc<RateLimiterConfig>,
}

impl RateLimiterLayer {
    /// Creates a new `RateLimiterLayer` with the given configuration.
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring a rate limiter layer.
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }

    pub(crate) fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimitedSender<S>;

    fn layer(&self, sender: S) -> Self::Service {
        RateLimitedSender::new(sender, Arc::clone(&self.config))
    }
}
