//! Resilient transactional notification delivery.
//!
//! `notify-resilience` wraps unreliable notification providers (SMS
//! gateways and the like) in a stack of decorators, each adding one
//! behavior to the same single-method [`Sender`](core::Sender) capability.
//! Each decorator is available as an individual crate and as a feature of
//! this meta-crate.
//!
//! # Decorators
//!
//! - **Rate limiter** (`ratelimiter` feature): sliding window limit, fails
//!   closed when the limiter itself is unavailable
//! - **Auth** (`auth` feature): resolves signed template tokens into real
//!   template ids
//! - **Time limiter** (`timelimiter` feature): per-call deadlines
//! - **Failover** (`failover` feature): sticky adaptive failover driven by
//!   consecutive timeouts, and stateless round-robin
//! - **Async** (`async` feature): moves rate-limited or persistently slow
//!   sends onto a durable job queue drained by a background consumer
//! - **Queue** (`queue` feature, `postgres` for the database store): the job
//!   store behind the async decorator
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! notify-resilience = { version = "0.3", features = ["full"] }
//! ```
//!
//! With `pipeline` (included in `full`), [`Pipeline`] assembles the whole
//! chain in production order:
//!
//! ```rust,no_run
//! # #[cfg(feature = "pipeline")]
//! # {
//! use notify_resilience::{LocalSender, Pipeline};
//! use notify_resilience::core::{SendRequest, Sender};
//!
//! # async fn example(signed_token: String) -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::builder()
//!     .secret(std::env::var("TEMPLATE_SECRET")?)
//!     .provider(LocalSender::new())
//!     .build()?
//!     .start();
//!
//! pipeline
//!     .send(SendRequest::new(signed_token, vec!["123456".into()], vec!["+15550100".into()]))
//!     .await?;
//! # Ok(())
//! # }
//! # }
//! ```

// Re-export core (always available)
pub use notify_resilience_core as core;

mod local;
pub use local::LocalSender;

// Re-export decorators based on features
#[cfg(feature = "async")]
pub use notify_resilience_async as r#async;

#[cfg(feature = "auth")]
pub use notify_resilience_auth as auth;

#[cfg(feature = "failover")]
pub use notify_resilience_failover as failover;

#[cfg(feature = "queue")]
pub use notify_resilience_queue as queue;

#[cfg(feature = "ratelimiter")]
pub use notify_resilience_ratelimiter as ratelimiter;

#[cfg(feature = "timelimiter")]
pub use notify_resilience_timelimiter as timelimiter;

#[cfg(feature = "pipeline")]
mod pipeline;

#[cfg(feature = "pipeline")]
pub use pipeline::{Pipeline, PipelineBuilder, PipelineError, PipelineSender, RunningPipeline};
