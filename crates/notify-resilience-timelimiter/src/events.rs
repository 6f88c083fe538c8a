use std::fmt;
use std::time::Duration;

/// How a provider call under a deadline ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The provider accepted the message in time.
    Delivered,
    /// The provider answered in time, with an error.
    Failed,
    /// The deadline passed first and the call was dropped.
    Expired,
}

impl CallOutcome {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CallOutcome::Delivered => "success",
            CallOutcome::Failed => "error",
            CallOutcome::Expired => "timeout",
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reported once for every call through a
/// [`TimeLimitedSender`](crate::TimeLimitedSender).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineEvent {
    pub outcome: CallOutcome,
    /// Time spent waiting on the provider.
    pub elapsed: Duration,
}
