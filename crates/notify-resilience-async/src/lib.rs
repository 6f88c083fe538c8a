//! Latency-adaptive async delivery for notification senders.
//!
//! [`AsyncSender`] times every call to its inner sender and keeps a small
//! rolling window of those latencies. When the inner sender is rate limited,
//! or the window mean shows sustained slowness, the request is written to a
//! [`JobStore`] and the caller gets `Ok(())`: the message has been accepted
//! for delivery, not delivered. A single slow call among fast ones does not
//! trip the switch. Until the window fills, the mean covers only the calls
//! seen so far, so the very first call trips it on its own if it is slow
//! enough.
//!
//! Queued jobs are drained by a [`Consumer`], which claims one job at a time,
//! sends it through a sender of its own (normally the chain below the rate
//! limiter) and reports the outcome back to the store. Failed jobs become
//! claimable again once the backoff window has passed, until their attempt
//! budget runs out.
//!
//! Delivery through the queue is at-least-once: a send that succeeded slowly
//! while the window was degraded is queued as well.
//!
//! # Examples
//!
//! ```
//! use notify_resilience_async::AsyncLayer;
//! use notify_resilience_core::{sender_fn, SendError, SendRequest, Sender};
//! use notify_resilience_queue::MemoryJobStore;
//! use std::time::Duration;
//! use tower::Layer;
//!
//! # async fn example() -> Result<(), SendError> {
//! let store = MemoryJobStore::new();
//!
//! let sender = AsyncLayer::builder()
//!     .latency_threshold(Duration::from_millis(500))
//!     .on_enqueued(|reason, id| println!("queued job {} ({})", id, reason))
//!     .build(store.clone())
//!     .layer(sender_fn(|_req: SendRequest| async { Err::<(), _>(SendError::RateLimitExceeded) }));
//!
//! // Rate limited, so the request is queued and the caller sees success
//! sender
//!     .send(SendRequest::new("otp", vec!["123456".into()], vec!["+15550100".into()]))
//!     .await?;
//! assert_eq!(store.jobs().await.len(), 1);
//! # Ok(())
//! # }
//! ```

mod config;
mod consumer;
mod events;
mod layer;
mod window;

pub use config::{
    AsyncSenderConfig, AsyncSenderConfigBuilder, ConsumerConfig, ConsumerConfigBuilder,
};
pub use consumer::{Consumer, ConsumerHandle, RunOutcome};
pub use events::{AsyncEvent, ConsumerEvent, EnqueueReason};
pub use layer::AsyncLayer;
pub use window::LatencyWindow;

use futures::future::BoxFuture;
use notify_resilience_core::{SendError, SendRequest, Sender};
use notify_resilience_queue::{JobStore, NewJob};
use std::sync::Arc;

#[cfg(feature = "metrics")]
use metrics::{counter, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// A [`Sender`] that converts degraded or rate-limited sends into queued
/// jobs.
pub struct AsyncSender<S> {
    inner: S,
    store: Arc<dyn JobStore>,
    window: Arc<LatencyWindow>,
    config: Arc<AsyncSenderConfig>,
}

impl<S> AsyncSender<S> {
    /// Creates a new `AsyncSender` wrapping the given sender.
    pub fn new(
        inner: S,
        store: Arc<dyn JobStore>,
        window: Arc<LatencyWindow>,
        config: Arc<AsyncSenderConfig>,
    ) -> Self {
        Self {
            inner,
            store,
            window,
            config,
        }
    }

    /// Returns a reference to the wrapped sender.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Returns the latency window driving the degradation decision.
    pub fn window(&self) -> &LatencyWindow {
        &self.window
    }

    async fn enqueue(&self, request: SendRequest, reason: EnqueueReason) -> Result<(), SendError> {
        let job = match self
            .store
            .insert(NewJob::new(request, self.config.retry_max))
            .await
        {
            Ok(job) => job,
            Err(error) => {
                #[cfg(feature = "tracing")]
                warn!(
                    async_sender = %self.config.name,
                    reason = %reason,
                    error = %error,
                    "failed to enqueue send"
                );

                return Err(error.into());
            }
        };

        #[cfg(feature = "tracing")]
        debug!(
            async_sender = %self.config.name,
            reason = %reason,
            job_id = job.id,
            "send converted to queued job"
        );

        self.config.observers.notify(&AsyncEvent::Enqueued {
            reason,
            job_id: job.id,
        });

        #[cfg(feature = "metrics")]
        counter!(
            "async_enqueued_total",
            "async" => self.config.name.clone(),
            "reason" => reason.as_str()
        )
        .increment(1);

        Ok(())
    }
}

impl<S> Clone for AsyncSender<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            store: Arc::clone(&self.store),
            window: Arc::clone(&self.window),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> Sender for AsyncSender<S>
where
    S: Sender,
{
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        Box::pin(async move {
            request.validate()?;

            let start = tokio::time::Instant::now();
            let result = self.inner.send(request.clone()).await;
            let duration = start.elapsed();

            #[cfg(feature = "metrics")]
            histogram!(
                "async_send_duration_seconds",
                "async" => self.config.name.clone()
            )
            .record(duration.as_secs_f64());

            let degraded = self
                .window
                .record(duration, self.config.latency_threshold);

            let reason = match &result {
                Err(SendError::Authentication(_) | SendError::InvalidRequest(_)) => None,
                Err(SendError::RateLimitExceeded) => Some(EnqueueReason::RateLimited),
                _ if degraded => Some(EnqueueReason::Degraded),
                _ => None,
            };

            if let Some(reason) = reason {
                return self.enqueue(request, reason).await;
            }

            self.config.observers.notify(&AsyncEvent::Passthrough { duration });

            result
        })
    }
}
