use crate::error::StoreError;
use chrono::{DateTime, Utc};
use notify_resilience_core::SendRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a queued delivery.
///
/// `Success` and `Failed` are terminal: once a job reaches either it never
/// changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Queued, possibly with failed attempts behind it.
    Waiting,
    /// Retries exhausted.
    Failed,
    /// Delivered.
    Success,
}

impl JobStatus {
    /// Storage code: waiting 0, failed 1, success 2.
    pub fn as_i16(self) -> i16 {
        match self {
            JobStatus::Waiting => 0,
            JobStatus::Failed => 1,
            JobStatus::Success => 2,
        }
    }

    /// Returns `true` for `Success` and `Failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Waiting)
    }
}

impl TryFrom<i16> for JobStatus {
    type Error = StoreError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(JobStatus::Waiting),
            1 => Ok(JobStatus::Failed),
            2 => Ok(JobStatus::Success),
            other => Err(StoreError::Serialization(format!(
                "unknown job status code {}",
                other
            ))),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Waiting => "waiting",
            JobStatus::Failed => "failed",
            JobStatus::Success => "success",
        };
        f.write_str(name)
    }
}

/// A persisted unit of deferred delivery work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Assigned by the store on insert.
    pub id: i64,
    /// The delivery to perform.
    pub request: SendRequest,
    /// Number of claims so far. Only a claim increments it.
    pub retry_count: u32,
    /// Fixed when the job is enqueued.
    pub retry_max: u32,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Refreshed by every claim and status change; claim eligibility is
    /// measured from here.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Returns `true` once every allowed attempt has been claimed.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.retry_max
    }
}

/// Insert payload for [`JobStore::insert`](crate::JobStore::insert).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub request: SendRequest,
    pub retry_max: u32,
}

impl NewJob {
    /// Creates an insert payload.
    pub fn new(request: SendRequest, retry_max: u32) -> Self {
        Self { request, retry_max }
    }
}
