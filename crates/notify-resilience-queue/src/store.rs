use crate::error::StoreError;
use crate::job::{Job, NewJob};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Durable storage for queued deliveries.
///
/// Implementations must make [`claim_one`](JobStore::claim_one) exclusive:
/// of any number of concurrent claimants, at most one receives a given job
/// until that job's `updated_at` ages past the caller's cut-off again.
pub trait JobStore: Send + Sync {
    /// Persists a new `Waiting` job with `retry_count` 0.
    fn insert(&self, job: NewJob) -> BoxFuture<'_, Result<Job, StoreError>>;

    /// Claims the oldest `Waiting` job whose `updated_at` is before
    /// `older_than`.
    ///
    /// The claim increments `retry_count`, sets `updated_at` to now and
    /// returns the updated job. Returns [`StoreError::NotFound`] when nothing
    /// is eligible.
    fn claim_one(&self, older_than: DateTime<Utc>) -> BoxFuture<'_, Result<Job, StoreError>>;

    /// Moves a `Waiting` job to `Success`. Terminal jobs are left alone.
    fn mark_success(&self, id: i64) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Moves a `Waiting` job to `Failed` if its retries are exhausted.
    ///
    /// Returns `true` only when the transition happened.
    fn mark_failed(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>>;

    /// Moves a `Waiting` job to `Failed` whatever its remaining retries, for
    /// deliveries no further attempt could fix.
    ///
    /// Returns `true` only when the transition happened.
    fn mark_abandoned(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>>;

    /// Fetches a job by id.
    fn get(&self, id: i64) -> BoxFuture<'_, Result<Job, StoreError>>;
}

impl<T> JobStore for Arc<T>
where
    T: JobStore + ?Sized,
{
    fn insert(&self, job: NewJob) -> BoxFuture<'_, Result<Job, StoreError>> {
        (**self).insert(job)
    }

    fn claim_one(&self, older_than: DateTime<Utc>) -> BoxFuture<'_, Result<Job, StoreError>> {
        (**self).claim_one(older_than)
    }

    fn mark_success(&self, id: i64) -> BoxFuture<'_, Result<(), StoreError>> {
        (**self).mark_success(id)
    }

    fn mark_failed(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>> {
        (**self).mark_failed(id)
    }

    fn mark_abandoned(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>> {
        (**self).mark_abandoned(id)
    }

    fn get(&self, id: i64) -> BoxFuture<'_, Result<Job, StoreError>> {
        (**self).get(id)
    }
}
