//! Per-call deadline for notification senders.
//!
//! Delivery providers carry no deadline of their own. [`TimeLimitedSender`]
//! races the inner send against a timer and, when the timer wins, drops the
//! send and fails with [`SendError::Timeout`]. That is the failure class the
//! adaptive failover counts and the one the async orchestrator treats as a
//! slow provider.
//!
//! ```rust
//! use notify_resilience_timelimiter::TimeLimiterLayer;
//! use notify_resilience_core::{sender_fn, SendError, SendRequest, Sender};
//! use std::time::Duration;
//! use tower::Layer;
//!
//! # async fn example() {
//! let layer = TimeLimiterLayer::builder()
//!     .deadline(Duration::from_millis(50))
//!     .on_expired(|| eprintln!("provider too slow"))
//!     .build();
//!
//! let slow = layer.layer(sender_fn(|_req: SendRequest| async {
//!     tokio::time::sleep(Duration::from_secs(1)).await;
//!     Ok::<_, SendError>(())
//! }));
//!
//! let result = slow.send(SendRequest::new("tpl", vec![], vec!["+15550100".into()])).await;
//! assert_eq!(result, Err(SendError::Timeout));
//! # }
//! ```

use futures::future::BoxFuture;
use layer::Deadline;
use notify_resilience_core::{SendError, SendRequest, Sender};
use std::sync::Arc;
use tokio::time::{timeout, Instant};

#[cfg(feature = "metrics")]
use metrics::{counter, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

pub use events::{CallOutcome, DeadlineEvent};
pub use layer::{TimeLimiterBuilder, TimeLimiterLayer};

mod events;
mod layer;

/// A sender that fails with [`SendError::Timeout`] when the inner send
/// outlives its deadline.
pub struct TimeLimitedSender<S> {
    inner: S,
    deadline: Arc<Deadline>,
}

impl<S> TimeLimitedSender<S> {
    pub(crate) fn new(inner: S, deadline: Arc<Deadline>) -> Self {
        Self { inner, deadline }
    }

    /// Returns a reference to the wrapped sender.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    fn report(&self, event: DeadlineEvent) {
        #[cfg(feature = "tracing")]
        match event.outcome {
            CallOutcome::Expired => warn!(
                timelimiter = %self.deadline.name,
                deadline_ms = self.deadline.limit.as_millis(),
                "provider call dropped at its deadline"
            ),
            outcome => debug!(
                timelimiter = %self.deadline.name,
                elapsed_ms = event.elapsed.as_millis(),
                outcome = outcome.as_str(),
                "provider answered within its deadline"
            ),
        }

        #[cfg(feature = "metrics")]
        {
            let name = self.deadline.name.clone();
            counter!("timelimiter_calls_total", "timelimiter" => name.clone(), "result" => event.outcome.as_str())
                .increment(1);
            if event.outcome != CallOutcome::Expired {
                histogram!("timelimiter_call_duration_seconds", "timelimiter" => name)
                    .record(event.elapsed.as_secs_f64());
            }
        }

        self.deadline.observers.notify(&event);
    }
}

impl<S: Clone> Clone for TimeLimitedSender<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            deadline: Arc::clone(&self.deadline),
        }
    }
}

impl<S> Sender for TimeLimitedSender<S>
where
    S: Sender,
{
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        Box::pin(async move {
            let started = Instant::now();

            let (result, outcome) =
                match timeout(self.deadline.limit, self.inner.send(request)).await {
                    Ok(Ok(())) => (Ok(()), CallOutcome::Delivered),
                    Ok(Err(error)) => (Err(error), CallOutcome::Failed),
                    Err(_elapsed) => (Err(SendError::Timeout), CallOutcome::Expired),
                };

            self.report(DeadlineEvent {
                outcome,
                elapsed: started.elapsed(),
            });
            result
        })
    }
}
