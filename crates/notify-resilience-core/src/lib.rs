//! Core infrastructure for notify-resilience.
//!
//! This crate provides the pieces shared by every decorator in the workspace:
//! - The [`Sender`] capability and the [`SendRequest`] it carries
//! - The [`SendError`] taxonomy that decorators propagate and classify
//! - [`Observers`], the callback lists behind every builder's `on_*` methods
//! - Clock abstraction so time-driven components can be tested deterministically
//!
//! # Examples
//!
//! ```
//! use notify_resilience_core::{sender_fn, SendError, SendRequest, Sender};
//!
//! # async fn example() -> Result<(), SendError> {
//! let provider = sender_fn(|req: SendRequest| async move {
//!     println!("sending {} to {:?}", req.template_id, req.recipients);
//!     Ok::<_, SendError>(())
//! });
//!
//! provider
//!     .send(SendRequest::new("1263395", vec!["123456".into()], vec!["+8613711112222".into()]))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod error;
pub mod events;
pub mod request;
pub mod sender;
#[cfg(feature = "service")]
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SendError;
pub use events::Observers;
pub use request::SendRequest;
pub use sender::{sender_fn, Sender, SenderFn};
#[cfg(feature = "service")]
pub use service::SenderService;
