use thiserror::Error;

/// Errors raised while building a failover sender.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailoverError {
    /// The provider list was empty.
    #[error("failover requires at least one provider")]
    NoProviders,
}
