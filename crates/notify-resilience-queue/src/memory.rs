use crate::error::StoreError;
use crate::job::{Job, JobStatus, NewJob};
use crate::store::JobStore;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use notify_resilience_core::{Clock, SystemClock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

struct State {
    next_id: i64,
    jobs: BTreeMap<i64, Job>,
}

/// In-process [`JobStore`].
///
/// Every operation runs inside one critical section, which gives claims the
/// same exclusivity a row lock gives the database store. Jobs do not survive
/// the process; use it for tests and single-node deployments that accept
/// that.
///
/// Clones share the same jobs.
#[derive(Clone)]
pub struct MemoryJobStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl MemoryJobStore {
    /// Creates an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store stamped by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_id: 1,
                jobs: BTreeMap::new(),
            })),
            clock,
        }
    }

    /// Snapshot of every job, ordered by id.
    pub async fn jobs(&self) -> Vec<Job> {
        self.state.lock().await.jobs.values().cloned().collect()
    }

    /// Number of jobs currently in `status`.
    pub async fn count_by_status(&self, status: JobStatus) -> usize {
        self.state
            .lock()
            .await
            .jobs
            .values()
            .filter(|job| job.status == status)
            .count()
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryJobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryJobStore")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl JobStore for MemoryJobStore {
    fn insert(&self, job: NewJob) -> BoxFuture<'_, Result<Job, StoreError>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let now = self.clock.now();

            let id = state.next_id;
            state.next_id += 1;

            let job = Job {
                id,
                request: job.request,
                retry_count: 0,
                retry_max: job.retry_max,
                status: JobStatus::Waiting,
                created_at: now,
                updated_at: now,
            };
            state.jobs.insert(id, job.clone());
            Ok(job)
        })
    }

    fn claim_one(&self, older_than: DateTime<Utc>) -> BoxFuture<'_, Result<Job, StoreError>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;

            let id = state
                .jobs
                .values()
                .filter(|job| job.status == JobStatus::Waiting && job.updated_at < older_than)
                .min_by_key(|job| (job.updated_at, job.id))
                .map(|job| job.id)
                .ok_or(StoreError::NotFound)?;

            let now = self.clock.now();
            let job = state.jobs.get_mut(&id).ok_or(StoreError::NotFound)?;
            job.retry_count += 1;
            job.updated_at = now;
            Ok(job.clone())
        })
    }

    fn mark_success(&self, id: i64) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            let job = state.jobs.get_mut(&id).ok_or(StoreError::NotFound)?;

            if job.status == JobStatus::Waiting {
                job.status = JobStatus::Success;
                job.updated_at = now;
            }
            Ok(())
        })
    }

    fn mark_failed(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            let job = state.jobs.get_mut(&id).ok_or(StoreError::NotFound)?;

            if job.status != JobStatus::Waiting || !job.retries_exhausted() {
                return Ok(false);
            }
            job.status = JobStatus::Failed;
            job.updated_at = now;
            Ok(true)
        })
    }

    fn mark_abandoned(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            let job = state.jobs.get_mut(&id).ok_or(StoreError::NotFound)?;

            if job.status != JobStatus::Waiting {
                return Ok(false);
            }
            job.status = JobStatus::Failed;
            job.updated_at = now;
            Ok(true)
        })
    }

    fn get(&self, id: i64) -> BoxFuture<'_, Result<Job, StoreError>> {
        Box::pin(async move {
            self.state
                .lock()
                .await
                .jobs
                .get(&id)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }
}
