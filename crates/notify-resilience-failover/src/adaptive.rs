//! Timeout-driven provider switching.

use crate::config::{AdaptiveFailoverBuilder, FailoverConfig};
use crate::events::FailoverEvent;
use futures::future::BoxFuture;
use notify_resilience_core::{SendError, SendRequest, Sender};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[cfg(feature = "metrics")]
use metrics::counter;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Breaker state shared by every clone of one sender.
///
/// The provider index sits in the high 32 bits and the consecutive timeout
/// count in the low 32, so a reader always sees a matching pair and a
/// switch moves the index and clears the count in one compare-and-swap. No
/// lock sits on the send path.
struct BreakerState(AtomicU64);

const COUNT_MASK: u64 = u32::MAX as u64;

fn pack(index: usize, timeouts: u32) -> u64 {
    ((index as u64) << 32) | u64::from(timeouts)
}

fn unpack(state: u64) -> (usize, u32) {
    ((state >> 32) as usize, (state & COUNT_MASK) as u32)
}

impl BreakerState {
    fn new(timeouts: u32) -> Self {
        Self(AtomicU64::new(pack(0, timeouts)))
    }

    fn load(&self) -> (usize, u32) {
        unpack(self.0.load(Ordering::Acquire))
    }

    fn reset_timeouts(&self) {
        self.0.fetch_and(!COUNT_MASK, Ordering::AcqRel);
    }

    /// Returns the count after the increment. Saturates instead of spilling
    /// into the index.
    fn record_timeout(&self) -> u32 {
        let previous = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                let (index, timeouts) = unpack(state);
                Some(pack(index, timeouts.saturating_add(1)))
            })
            .unwrap_or_else(|state| state);
        unpack(previous).1.saturating_add(1)
    }
}

/// Sends through one provider at a time and moves to the next after a burst
/// of consecutive timeouts.
///
/// Per call the sender reads the current index and the timeout counter. If
/// the counter has reached the threshold it tries to swap the index for the
/// next provider and clear the counter in the same step. Concurrent callers
/// may all attempt the same swap; one wins and the rest observe the winner's
/// index and use it, so one burst of timeouts moves traffic by exactly one
/// provider.
///
/// A success resets the counter, a [`SendError::Timeout`] increments it, and
/// any other error leaves it untouched: a rejected phone number says nothing
/// about the provider's health.
///
/// Clones share breaker state.
///
/// ```
/// use notify_resilience_failover::AdaptiveFailoverSender;
/// use notify_resilience_core::{sender_fn, SendError, SendRequest, Sender};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let primary: Arc<dyn Sender> = Arc::new(sender_fn(|_req: SendRequest| async {
///     Err::<(), _>(SendError::Timeout)
/// }));
/// let backup: Arc<dyn Sender> = Arc::new(sender_fn(|_req: SendRequest| async {
///     Ok::<_, SendError>(())
/// }));
///
/// let sender = AdaptiveFailoverSender::builder()
///     .threshold(2)
///     .on_switch(|from, to| println!("failover {} -> {}", from, to))
///     .build([primary, backup])?;
///
/// let req = SendRequest::new("tpl", vec![], vec!["+15550100".into()]);
/// assert!(sender.send(req.clone()).await.is_err());
/// assert!(sender.send(req.clone()).await.is_err());
/// sender.send(req).await?;
/// assert_eq!(sender.current_index(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdaptiveFailoverSender {
    providers: Arc<[Arc<dyn Sender>]>,
    state: Arc<BreakerState>,
    threshold: u32,
    config: Arc<FailoverConfig>,
}

impl AdaptiveFailoverSender {
    pub(crate) fn new(
        providers: Vec<Arc<dyn Sender>>,
        config: Arc<FailoverConfig>,
        threshold: u32,
        initial_timeouts: u32,
    ) -> Self {
        Self {
            providers: providers.into(),
            state: Arc::new(BreakerState::new(initial_timeouts)),
            threshold,
            config,
        }
    }

    /// Creates a new builder.
    pub fn builder() -> AdaptiveFailoverBuilder {
        AdaptiveFailoverBuilder::new()
    }

    /// Index of the provider new calls are currently routed to.
    pub fn current_index(&self) -> usize {
        self.state.load().0
    }

    /// Timeouts observed since the last success or switch.
    pub fn consecutive_timeouts(&self) -> u32 {
        self.state.load().1
    }

    /// Number of providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Picks the provider for this call, switching if the counter says so.
    fn select(&self) -> usize {
        let mut observed = self.state.0.load(Ordering::Acquire);

        loop {
            let (index, timeouts) = unpack(observed);
            if timeouts < self.threshold {
                return index;
            }

            let next = (index + 1) % self.providers.len();
            match self.state.0.compare_exchange(
                observed,
                pack(next, 0),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.switched(index, next, timeouts);
                    return next;
                }
                // Another caller switched first; follow it.
                Err(current) if unpack(current).0 != index => return unpack(current).0,
                // Only the count moved. Try again against the fresh value.
                Err(current) => observed = current,
            }
        }
    }

    fn switched(&self, from: usize, to: usize, _timeouts: u32) {
        self.config.observers.notify(&FailoverEvent::Switched { from, to });

        #[cfg(feature = "metrics")]
        counter!("failover_switches_total", "failover" => self.config.name.clone()).increment(1);

        #[cfg(feature = "tracing")]
        info!(
            failover = %self.config.name,
            from,
            to,
            timeouts = _timeouts,
            "switching provider after consecutive timeouts"
        );
    }
}

impl fmt::Debug for AdaptiveFailoverSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveFailoverSender")
            .field("name", &self.config.name)
            .field("providers", &self.providers.len())
            .field("current_index", &self.current_index())
            .field("consecutive_timeouts", &self.consecutive_timeouts())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl Sender for AdaptiveFailoverSender {
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        Box::pin(async move {
            let index = self.select();
            let result = self.providers[index].send(request).await;

            match &result {
                Ok(()) => {
                    self.state.reset_timeouts();

                    self.config.observers.notify(&FailoverEvent::Success { provider: index });

                    #[cfg(feature = "metrics")]
                    counter!("failover_calls_total", "failover" => self.config.name.clone(), "result" => "success")
                        .increment(1);
                }
                Err(SendError::Timeout) => {
                    let consecutive = self.state.record_timeout();

                    self.config.observers.notify(&FailoverEvent::Timeout {
                        provider: index,
                        consecutive,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("failover_calls_total", "failover" => self.config.name.clone(), "result" => "timeout")
                        .increment(1);

                    #[cfg(feature = "tracing")]
                    debug!(
                        failover = %self.config.name,
                        provider = index,
                        consecutive,
                        "provider timed out"
                    );
                }
                Err(_) => {
                    #[cfg(feature = "metrics")]
                    counter!("failover_calls_total", "failover" => self.config.name.clone(), "result" => "error")
                        .increment(1);
                }
            }

            result
        })
    }
}
