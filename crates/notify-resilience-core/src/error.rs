//! The error taxonomy shared by every sender in the pipeline.
//!
//! Decorators propagate errors they do not understand unchanged. The
//! variants are deliberately coarse so each layer can classify a failure
//! without knowing which provider produced it:
//!
//! - [`SendError::RateLimitExceeded`] is soft: the async orchestrator may turn
//!   it into a queued job.
//! - [`SendError::Timeout`] drives breaker switching and async conversion.
//! - [`SendError::Authentication`] and [`SendError::InvalidRequest`] are fatal
//!   and must never be masked or retried.
//!
//! ```
//! use notify_resilience_core::SendError;
//!
//! let err = SendError::Timeout;
//! assert!(err.is_timeout());
//! assert!(err.is_retryable());
//!
//! let err = SendError::Authentication("expired".into());
//! assert!(!err.is_retryable());
//! ```

use thiserror::Error;

/// Errors returned by a [`Sender`](crate::Sender).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The rate limiter rejected the call, or could not be consulted.
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// The template token failed verification.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The call did not complete before its deadline.
    #[error("send timed out")]
    Timeout,

    /// Every provider in a round-robin list failed.
    #[error("all {} providers failed", .failures.len())]
    AllProvidersFailed {
        /// The individual failures, in provider order.
        failures: Vec<SendError>,
    },

    /// The durable queue could not be written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The request cannot be delivered by anyone (no recipients, no template).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other provider failure.
    #[error("provider error: {0}")]
    Provider(String),
}

impl SendError {
    /// Creates a [`SendError::Provider`] from anything displayable.
    pub fn provider(msg: impl std::fmt::Display) -> Self {
        SendError::Provider(msg.to_string())
    }

    /// Returns `true` if this is a deadline failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SendError::Timeout)
    }

    /// Returns `true` if this is a rate limiter rejection.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SendError::RateLimitExceeded)
    }

    /// Returns `true` if this is a token verification failure.
    pub fn is_authentication(&self) -> bool {
        matches!(self, SendError::Authentication(_))
    }

    /// Returns `true` if a later attempt with the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            SendError::Authentication(_) | SendError::InvalidRequest(_)
        )
    }
}
