//! Multi-provider failover for notification senders.
//!
//! Two strategies over an ordered provider list:
//!
//! - [`RoundRobinSender`]: stateless. Every call walks the list in order and
//!   stops at the first success.
//! - [`AdaptiveFailoverSender`]: sticky. Calls go to one provider until it
//!   produces a burst of consecutive timeouts, then traffic moves to the
//!   next provider. Breaker state is lock-free and shared by all clones.
//!
//! Neither strategy is a `Layer`: both sit at the bottom of a chain, over a
//! list of providers rather than a single inner sender.
//!
//! # Examples
//!
//! ```
//! use notify_resilience_failover::RoundRobinSender;
//! use notify_resilience_core::{sender_fn, SendError, SendRequest, Sender};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let down: Arc<dyn Sender> = Arc::new(sender_fn(|_req: SendRequest| async {
//!     Err::<(), _>(SendError::provider("503"))
//! }));
//! let up: Arc<dyn Sender> = Arc::new(sender_fn(|_req: SendRequest| async {
//!     Ok::<_, SendError>(())
//! }));
//!
//! let sender = RoundRobinSender::builder()
//!     .name("sms")
//!     .on_provider_failed(|index, error| eprintln!("provider {} failed: {}", index, error))
//!     .build([down, up])?;
//!
//! sender
//!     .send(SendRequest::new("tpl", vec![], vec!["+15550100".into()]))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod adaptive;
mod config;
mod error;
mod events;
mod round_robin;

pub use adaptive::AdaptiveFailoverSender;
pub use config::{AdaptiveFailoverBuilder, FailoverConfig, RoundRobinBuilder};
pub use error::FailoverError;
pub use events::FailoverEvent;
pub use round_robin::RoundRobinSender;
