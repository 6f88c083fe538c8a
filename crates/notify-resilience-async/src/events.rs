use notify_resilience_core::SendError;
use std::fmt;
use std::time::Duration;

/// Why a send was converted into a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueReason {
    /// The inner sender reported [`SendError::RateLimitExceeded`].
    RateLimited,
    /// The rolling latency mean reached the threshold.
    Degraded,
}

impl EnqueueReason {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            EnqueueReason::RateLimited => "rate_limited",
            EnqueueReason::Degraded => "degraded",
        }
    }
}

impl fmt::Display for EnqueueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events emitted by [`AsyncSender`](crate::AsyncSender).
#[derive(Debug, Clone)]
pub enum AsyncEvent {
    /// The request was persisted for background delivery.
    Enqueued {
        reason: EnqueueReason,
        /// Id assigned by the job store.
        job_id: i64,
    },
    /// The inner outcome was returned to the caller unchanged.
    Passthrough {
        /// How long the inner send took.
        duration: Duration,
    },
}

/// Events emitted by the background [`Consumer`](crate::Consumer).
#[derive(Debug, Clone)]
pub enum ConsumerEvent {
    /// A job was claimed and is about to be delivered.
    Claimed {
        job_id: i64,
        /// Attempt number, counting this one.
        attempt: u32,
    },
    /// The job was delivered and marked successful.
    Delivered { job_id: i64 },
    /// Delivery failed.
    AttemptFailed {
        job_id: i64,
        error: SendError,
        /// `true` when this failure moved the job to `Failed`.
        exhausted: bool,
    },
    /// Nothing was eligible for a claim.
    Idle,
}
