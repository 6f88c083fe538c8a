//! Background drain for queued deliveries.
//!
//! The consumer loop is: claim one eligible job, deliver it outside the
//! claim, report the outcome, repeat. An empty queue or a failing store puts
//! the loop to sleep for the idle backoff. Retries need no timer of their
//! own: a failed job stays `Waiting` with a fresh `updated_at` and becomes
//! claimable again once it ages past the backoff window. A failure that is
//! not [retryable](SendError::is_retryable), such as an authentication error,
//! fails the job at once.
//!
//! Any number of consumers, in any number of processes, may drain the same
//! store; claim exclusivity is the store's job.

use crate::config::ConsumerConfig;
use crate::events::ConsumerEvent;
use chrono::{DateTime, Utc};
use notify_resilience_core::{Clock, SendError, Sender};
use notify_resilience_queue::{Job, JobStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "metrics")]
use metrics::counter;

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

/// Result of a single [`Consumer::run_once`] iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A job was claimed and a delivery attempted.
    Processed {
        id: i64,
        /// What the sender returned, with an expired deadline reported as
        /// [`SendError::Timeout`].
        outcome: Result<(), SendError>,
    },
    /// Nothing was eligible for a claim.
    Idle,
    /// The claim itself failed.
    StoreError(StoreError),
}

/// Drains a [`JobStore`] through a [`Sender`].
pub struct Consumer<S> {
    sender: S,
    store: Arc<dyn JobStore>,
    clock: Arc<dyn Clock>,
    config: Arc<ConsumerConfig>,
}

impl<S> Consumer<S>
where
    S: Sender,
{
    /// Creates a consumer that delivers claimed jobs through `sender`.
    ///
    /// `clock` drives the startup delay, idle sleeps and the claim cut-off.
    pub fn new(
        sender: S,
        store: Arc<dyn JobStore>,
        clock: Arc<dyn Clock>,
        config: ConsumerConfig,
    ) -> Self {
        Self {
            sender,
            store,
            clock,
            config: Arc::new(config),
        }
    }

    /// Runs one claim and delivery cycle without sleeping.
    pub async fn run_once(&self) -> RunOutcome {
        let cutoff = self.cutoff();

        let claimed = match tokio::time::timeout(
            self.config.claim_timeout,
            self.store.claim_one(cutoff),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(StoreError::Database(format!(
                "claim timed out after {:?}",
                self.config.claim_timeout
            ))),
        };

        let job = match claimed {
            Ok(job) => job,
            Err(StoreError::NotFound) => {
                self.config.observers.notify(&ConsumerEvent::Idle);
                self.record("idle");
                return RunOutcome::Idle;
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                warn!(consumer = %self.config.name, error = %error, "failed to claim job");

                self.record("store_error");
                return RunOutcome::StoreError(error);
            }
        };

        let id = job.id;
        let outcome = self.deliver(job).await;
        RunOutcome::Processed { id, outcome }
    }

    async fn deliver(&self, job: Job) -> Result<(), SendError> {
        self.config.observers.notify(&ConsumerEvent::Claimed {
            job_id: job.id,
            attempt: job.retry_count,
        });

        #[cfg(feature = "tracing")]
        debug!(
            consumer = %self.config.name,
            job_id = job.id,
            attempt = job.retry_count,
            retry_max = job.retry_max,
            "delivering queued job"
        );

        let outcome =
            match tokio::time::timeout(self.config.send_timeout, self.sender.send(job.request))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(SendError::Timeout),
            };

        match &outcome {
            Ok(()) => {
                if let Err(_error) = self.store.mark_success(job.id).await {
                    #[cfg(feature = "tracing")]
                    warn!(
                        consumer = %self.config.name,
                        job_id = job.id,
                        error = %_error,
                        "failed to mark job delivered"
                    );
                }

                self.config.observers.notify(&ConsumerEvent::Delivered { job_id: job.id });
                self.record("delivered");
            }
            Err(error) => {
                // Fatal errors end the job now; only transient ones use up retries.
                let marked = if error.is_retryable() {
                    self.store.mark_failed(job.id).await
                } else {
                    self.store.mark_abandoned(job.id).await
                };
                let exhausted = match marked {
                    Ok(exhausted) => exhausted,
                    Err(_store_error) => {
                        #[cfg(feature = "tracing")]
                        warn!(
                            consumer = %self.config.name,
                            job_id = job.id,
                            error = %_store_error,
                            "failed to record delivery failure"
                        );
                        false
                    }
                };

                #[cfg(feature = "tracing")]
                warn!(
                    consumer = %self.config.name,
                    job_id = job.id,
                    attempt = job.retry_count,
                    exhausted,
                    error = %error,
                    "queued delivery failed"
                );

                self.config.observers.notify(&ConsumerEvent::AttemptFailed {
                    job_id: job.id,
                    error: error.clone(),
                    exhausted,
                });
                self.record(if exhausted { "failed" } else { "retry" });
            }
        }

        outcome
    }

    fn cutoff(&self) -> DateTime<Utc> {
        let window = chrono::Duration::from_std(self.config.backoff_window)
            .unwrap_or(chrono::Duration::MAX);
        self.clock
            .now()
            .checked_sub_signed(window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn record(&self, _result: &'static str) {
        #[cfg(feature = "metrics")]
        counter!(
            "consumer_jobs_total",
            "consumer" => self.config.name.clone(),
            "result" => _result
        )
        .increment(1);
    }

    /// Sleeps on the consumer's clock. Returns `false` if cancelled first.
    async fn pause(&self, duration: Duration, token: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            () = token.cancelled() => false,
            () = self.clock.sleep(duration) => true,
        }
    }

    async fn run(&self, token: CancellationToken) {
        #[cfg(feature = "tracing")]
        info!(consumer = %self.config.name, "consumer started");

        if self.pause(self.config.startup_delay, &token).await {
            while !token.is_cancelled() {
                match self.run_once().await {
                    RunOutcome::Processed { .. } => {}
                    RunOutcome::Idle | RunOutcome::StoreError(_) => {
                        if !self.pause(self.config.idle_backoff, &token).await {
                            break;
                        }
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        info!(consumer = %self.config.name, "consumer stopped");
    }
}

impl<S> Consumer<S>
where
    S: Sender + 'static,
{
    /// Spawns the consumer loop on the current tokio runtime.
    ///
    /// The loop runs until [`ConsumerHandle::shutdown`] is called or the
    /// handle is dropped. A delivery in flight at that point is allowed to
    /// finish.
    pub fn start(self) -> ConsumerHandle {
        let token = CancellationToken::new();
        let consumer = Arc::new(self);

        let task = {
            let token = token.clone();
            tokio::spawn(async move { consumer.run(token).await })
        };

        ConsumerHandle {
            token,
            task: Some(task),
        }
    }
}

/// Owner of a running consumer loop.
///
/// Dropping the handle cancels the loop without waiting for it.
#[derive(Debug)]
pub struct ConsumerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ConsumerHandle {
    /// Returns `true` once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops the loop and waits for it to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();

        if let Some(task) = self.task.take() {
            if let Err(_error) = task.await {
                #[cfg(feature = "tracing")]
                warn!(error = %_error, "consumer task did not exit cleanly");
            }
        }
    }
}

impl Drop for ConsumerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
