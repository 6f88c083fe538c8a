/// Events emitted by the rate limiting decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimiterEvent {
    /// The limiter admitted the call and it was forwarded.
    Permitted,
    /// The call was rejected without reaching the inner sender.
    Rejected {
        /// `true` when the rejection came from a limiter failure rather than
        /// an over-limit answer.
        limiter_error: bool,
    },
}
