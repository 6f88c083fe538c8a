use notify_resilience_core::SendError;

/// Events emitted by the failover senders.
///
/// Provider positions are indices into the list the sender was built with.
#[derive(Debug, Clone)]
pub enum FailoverEvent {
    /// The adaptive sender moved traffic to another provider.
    Switched { from: usize, to: usize },
    /// A provider timed out; `consecutive` is the count after this timeout.
    Timeout {
        provider: usize,
        consecutive: u32,
    },
    /// A provider delivered the message.
    Success { provider: usize },
    /// A provider failed during a round-robin attempt.
    ProviderFailed {
        provider: usize,
        error: SendError,
    },
}
