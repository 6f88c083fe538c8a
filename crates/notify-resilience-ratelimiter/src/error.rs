use thiserror::Error;

/// Failure to consult a [`Limiter`](crate::Limiter).
///
/// The decorator never lets this through: an unreachable limiter is treated
/// as a rejection, surfaced as `SendError::RateLimitExceeded`.
#[derive(Debug, Clone, Error)]
pub enum LimiterError {
    /// The backing store (e.g. a shared counter service) could not be reached.
    #[error("limiter backend unavailable: {0}")]
    Unavailable(String),
}
