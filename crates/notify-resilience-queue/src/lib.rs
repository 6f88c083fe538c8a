//! Durable job store for deferred notification delivery.
//!
//! When a send is rate limited or the providers are slow, the message is
//! persisted as a [`Job`] instead of being dropped. A background consumer
//! later claims jobs one at a time, retries delivery, and records the
//! outcome. Jobs are never deleted; terminal jobs stay for audit.
//!
//! Two stores implement [`JobStore`]:
//!
//! - [`MemoryJobStore`]: in-process, for tests and single-node setups
//! - `PgJobStore`: PostgreSQL, behind the `postgres` feature
//!
//! # Lifecycle
//!
//! ```text
//! insert ──► Waiting ──claim──► (attempt) ──ok──► Success
//!               ▲                   │
//!               └── not exhausted ◄─┴─fail─► exhausted ──► Failed
//! ```
//!
//! # Examples
//!
//! ```
//! use notify_resilience_queue::{JobStatus, JobStore, MemoryJobStore, NewJob};
//! use notify_resilience_core::SendRequest;
//! use chrono::Utc;
//!
//! # async fn example() -> Result<(), notify_resilience_queue::StoreError> {
//! let store = MemoryJobStore::new();
//! let request = SendRequest::new("1263395", vec!["123456".into()], vec!["+15550100".into()]);
//! let job = store.insert(NewJob::new(request, 3)).await?;
//! assert_eq!(job.status, JobStatus::Waiting);
//!
//! // Eligible once its updated_at is older than the cut-off.
//! let claimed = store.claim_one(Utc::now() + chrono::Duration::seconds(1)).await?;
//! assert_eq!(claimed.retry_count, 1);
//! store.mark_success(claimed.id).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod job;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;
mod store;

pub use error::StoreError;
pub use job::{Job, JobStatus, NewJob};
pub use memory::MemoryJobStore;
#[cfg(feature = "postgres")]
pub use postgres::PgJobStore;
pub use store::JobStore;
