//! Template token authentication for notification senders.
//!
//! Callers pass a signed token in place of the template id. The
//! [`AuthenticatedSender`] verifies it, swaps in the real template id it
//! carries and forwards the request. A token that fails verification never
//! reaches the inner sender; the call fails with
//! [`SendError::Authentication`], which no other decorator retries or
//! converts.
//!
//! # Examples
//!
//! ```
//! use notify_resilience_auth::{AuthLayer, TemplateSigner};
//! use notify_resilience_core::{sender_fn, SendError, SendRequest, Sender};
//! use std::time::Duration;
//! use tower::Layer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "shared-secret";
//! let token = TemplateSigner::new(secret).sign("1263395", Duration::from_secs(300))?;
//!
//! let sender = AuthLayer::builder()
//!     .secret(secret)
//!     .build()
//!     .layer(sender_fn(|req: SendRequest| async move {
//!         assert_eq!(req.template_id, "1263395");
//!         Ok::<_, SendError>(())
//!     }));
//!
//! sender
//!     .send(SendRequest::new(token, vec!["123456".into()], vec!["+15550100".into()]))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod events;
mod layer;
mod token;

pub use config::{AuthConfig, AuthConfigBuilder};
pub use error::TokenError;
pub use events::AuthEvent;
pub use layer::AuthLayer;
pub use token::{TemplateClaims, TemplateSigner, TemplateVerifier};

use futures::future::BoxFuture;
use notify_resilience_core::{SendError, SendRequest, Sender};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// A [`Sender`] that resolves signed template tokens before delegating.
pub struct AuthenticatedSender<S> {
    inner: S,
    config: Arc<AuthConfig>,
}

impl<S> AuthenticatedSender<S> {
    /// Creates a new `AuthenticatedSender` wrapping the given sender.
    pub fn new(inner: S, config: Arc<AuthConfig>) -> Self {
        Self { inner, config }
    }

    /// Returns a reference to the wrapped sender.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S> Clone for AuthenticatedSender<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> Sender for AuthenticatedSender<S>
where
    S: Sender,
{
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        let verified = self.config.verifier.verify(&request.template_id);

        Box::pin(async move {
            match verified {
                Ok(template_id) => {
                    #[cfg(feature = "tracing")]
                    debug!(auth = %self.config.name, template_id = %template_id, "template token verified");

                    self.config.observers.notify(&AuthEvent::Verified {
                        template_id: template_id.clone(),
                    });

                    self.inner.send(request.with_template(template_id)).await
                }
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    warn!(auth = %self.config.name, error = %error, "template token rejected");

                    self.config.observers.notify(&AuthEvent::Rejected {
                        error: error.clone(),
                    });

                    Err(error.into())
                }
            }
        })
    }
}
