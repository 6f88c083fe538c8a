//! Rate limiting decorator for notification senders.
//!
//! [`RateLimitedSender`] asks a [`Limiter`] whether a call may proceed before
//! forwarding it. A call over the limit never reaches the inner sender and
//! fails with [`SendError::RateLimitExceeded`]. The limiter failing is
//! treated the same way: the decorator fails closed.
//!
//! # Examples
//!
//! ```
//! use notify_resilience_ratelimiter::{RateLimiterLayer, SlidingWindowLimiter};
//! use notify_resilience_core::{sender_fn, SendError, SendRequest, Sender};
//! use std::time::Duration;
//! use tower::Layer;
//!
//! # async fn example() {
//! // 2 messages per second, shared by every sender built from this layer
//! let layer = RateLimiterLayer::builder()
//!     .limiter(SlidingWindowLimiter::new(Duration::from_secs(1), 2))
//!     .on_rejected(|limiter_error| println!("rejected (limiter error: {})", limiter_error))
//!     .build();
//!
//! let sender = layer.layer(sender_fn(|_req: SendRequest| async { Ok::<_, SendError>(()) }));
//! let request = SendRequest::new("otp", vec!["123456".into()], vec!["+15550100".into()]);
//!
//! assert!(sender.send(request.clone()).await.is_ok());
//! assert!(sender.send(request.clone()).await.is_ok());
//! assert_eq!(sender.send(request).await, Err(SendError::RateLimitExceeded));
//! # }
//! ```

mod config;
mod error;
mod events;
mod layer;
mod limiter;

pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use error::LimiterError;
pub use events::RateLimiterEvent;
pub use layer::RateLimiterLayer;
pub use limiter::{Limiter, SlidingWindowLimiter};

use futures::future::BoxFuture;
use notify_resilience_core::{SendError, SendRequest, Sender};
use std::sync::Arc;

#[cfg(feature = "metrics")]
use metrics::counter;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// A [`Sender`] that consults a [`Limiter`] before every send.
pub struct RateLimitedSender<S> {
    inner: S,
    config: Arc<RateLimiterConfig>,
}

impl<S> RateLimitedSender<S> {
    /// Creates a new `RateLimitedSender` wrapping the given sender.
    pub fn new(inner: S, config: Arc<RateLimiterConfig>) -> Self {
        Self { inner, config }
    }

    /// Returns a reference to the wrapped sender.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    fn reject(&self, limiter_error: bool) -> SendError {
        self.config.observers.notify(&RateLimiterEvent::Rejected { limiter_error });

        #[cfg(feature = "metrics")]
        counter!(
            "ratelimiter_calls_total",
            "ratelimiter" => self.config.name.clone(),
            "result" => if limiter_error { "error" } else { "rejected" }
        )
        .increment(1);

        SendError::RateLimitExceeded
    }
}

impl<S> Clone for RateLimitedSender<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> Sender for RateLimitedSender<S>
where
    S: Sender,
{
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        Box::pin(async move {
            match self.config.limiter.limit(&self.config.key).await {
                Ok(false) => {
                    self.config.observers.notify(&RateLimiterEvent::Permitted);

                    #[cfg(feature = "metrics")]
                    counter!(
                        "ratelimiter_calls_total",
                        "ratelimiter" => self.config.name.clone(),
                        "result" => "permitted"
                    )
                    .increment(1);

                    self.inner.send(request).await
                }
                Ok(true) => {
                    #[cfg(feature = "tracing")]
                    debug!(
                        ratelimiter = %self.config.name,
                        key = %self.config.key,
                        "rate limit reached, rejecting send"
                    );

                    Err(self.reject(false))
                }
                Err(_error) => {
                    #[cfg(feature = "tracing")]
                    warn!(
                        ratelimiter = %self.config.name,
                        key = %self.config.key,
                        error = %_error,
                        "limiter unavailable, rejecting send"
                    );

                    Err(self.reject(true))
                }
            }
        })
    }
}
