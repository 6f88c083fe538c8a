//! PostgreSQL-backed [`JobStore`].
//!
//! Claims lock the selected row with `FOR UPDATE SKIP LOCKED` inside a
//! transaction, so any number of consumers, in any number of processes, can
//! poll the same table without blocking each other or processing the same
//! job twice within one backoff window.

use crate::error::StoreError;
use crate::job::{Job, JobStatus, NewJob};
use crate::store::JobStore;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use notify_resilience_core::{Clock, SendRequest, SystemClock};
use sqlx::PgPool;
use std::fmt;
use std::sync::Arc;

const CREATE_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS notify_jobs (
        id          BIGSERIAL PRIMARY KEY,
        payload     JSONB       NOT NULL,
        retry_count INTEGER     NOT NULL DEFAULT 0,
        retry_max   INTEGER     NOT NULL,
        status      SMALLINT    NOT NULL DEFAULT 0,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
";

const CREATE_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS notify_jobs_status_updated_at
        ON notify_jobs (status, updated_at)
";

const COLUMNS: &str = "id, payload, retry_count, retry_max, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct JobRow {
    id: i64,
    payload: serde_json::Value,
    retry_count: i32,
    retry_max: i32,
    status: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let request: SendRequest = serde_json::from_value(row.payload)?;
        Ok(Job {
            id: row.id,
            request,
            retry_count: to_u32(row.retry_count)?,
            retry_max: to_u32(row.retry_max)?,
            status: JobStatus::try_from(row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn to_u32(value: i32) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::Serialization(format!("negative retry counter {}", value)))
}

/// [`JobStore`] over a `notify_jobs` table.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgJobStore {
    /// Creates a store over the given pool, stamped by the system clock.
    pub fn new(pool: PgPool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    /// Creates a store over the given pool, stamped by the given clock.
    pub fn with_clock(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `notify_jobs` table and its claim index if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if either statement fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    async fn claim(&self, older_than: DateTime<Utc>) -> Result<Job, StoreError> {
        let mut tx = self.pool.begin().await?;

        let id: Option<i64> = sqlx::query_scalar(
            r"
            SELECT id FROM notify_jobs
            WHERE status = $1 AND updated_at < $2
            ORDER BY updated_at ASC, id ASC
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            ",
        )
        .bind(JobStatus::Waiting.as_i16())
        .bind(older_than)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(id) = id else {
            tx.rollback().await?;
            return Err(StoreError::NotFound);
        };

        let row = sqlx::query_as::<_, JobRow>(&format!(
            "UPDATE notify_jobs SET retry_count = retry_count + 1, updated_at = $2 \
             WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .bind(self.clock.now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Job::try_from(row)
    }

    async fn exists(&self, id: i64) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM notify_jobs WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

impl fmt::Debug for PgJobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgJobStore")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl JobStore for PgJobStore {
    fn insert(&self, job: NewJob) -> BoxFuture<'_, Result<Job, StoreError>> {
        Box::pin(async move {
            let payload = serde_json::to_value(&job.request)?;
            let retry_max = i32::try_from(job.retry_max).map_err(|_| {
                StoreError::Serialization(format!("retry_max {} out of range", job.retry_max))
            })?;
            let now = self.clock.now();

            let row = sqlx::query_as::<_, JobRow>(&format!(
                "INSERT INTO notify_jobs (payload, retry_count, retry_max, status, created_at, updated_at) \
                 VALUES ($1, 0, $2, $3, $4, $4) RETURNING {}",
                COLUMNS
            ))
            .bind(payload)
            .bind(retry_max)
            .bind(JobStatus::Waiting.as_i16())
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

            Job::try_from(row)
        })
    }

    fn claim_one(&self, older_than: DateTime<Utc>) -> BoxFuture<'_, Result<Job, StoreError>> {
        Box::pin(self.claim(older_than))
    }

    fn mark_success(&self, id: i64) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE notify_jobs SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4",
            )
            .bind(id)
            .bind(JobStatus::Success.as_i16())
            .bind(self.clock.now())
            .bind(JobStatus::Waiting.as_i16())
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 && !self.exists(id).await? {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    fn mark_failed(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE notify_jobs SET status = $2, updated_at = $3 \
                 WHERE id = $1 AND status = $4 AND retry_count >= retry_max",
            )
            .bind(id)
            .bind(JobStatus::Failed.as_i16())
            .bind(self.clock.now())
            .bind(JobStatus::Waiting.as_i16())
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(true);
            }
            if !self.exists(id).await? {
                return Err(StoreError::NotFound);
            }
            Ok(false)
        })
    }

    fn mark_abandoned(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE notify_jobs SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4",
            )
            .bind(id)
            .bind(JobStatus::Failed.as_i16())
            .bind(self.clock.now())
            .bind(JobStatus::Waiting.as_i16())
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(true);
            }
            if !self.exists(id).await? {
                return Err(StoreError::NotFound);
            }
            Ok(false)
        })
    }

    fn get(&self, id: i64) -> BoxFuture<'_, Result<Job, StoreError>> {
        Box::pin(async move {
            let row = sqlx::query_as::<_, JobRow>(&format!(
                "SELECT {} FROM notify_jobs WHERE id = $1",
                COLUMNS
            ))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

            Job::try_from(row)
        })
    }
}
