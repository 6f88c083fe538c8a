use crate::{AuthConfig, AuthConfigBuilder, AuthenticatedSender};
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that verifies template tokens before sending.
#[derive(Clone)]
pub struct AuthLayer {
    config: Arc<AuthConfig>,
}

impl AuthLayer {
    /// Creates a new `AuthLayer` with the given configuration.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring an authentication layer.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::new()
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthenticatedSender<S>;

    fn layer(&self, sender: S) -> Self::Service {
        AuthenticatedSender::new(sender, Arc::clone(&self.config))
    }
}
