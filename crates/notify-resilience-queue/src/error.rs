use notify_resilience_core::SendError;
use thiserror::Error;

/// Errors returned by a [`JobStore`](crate::JobStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No job matched: the queue has nothing eligible, or the id is unknown.
    ///
    /// An empty queue is the normal idle state, not a failure.
    #[error("job not found")]
    NotFound,

    /// The backing store could not be reached or rejected the operation.
    #[error("job store error: {0}")]
    Database(String),

    /// A stored row could not be converted to or from a [`Job`](crate::Job).
    #[error("job serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<StoreError> for SendError {
    fn from(error: StoreError) -> Self {
        SendError::Persistence(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Serialization(error.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other.to_string()),
        }
    }
}
