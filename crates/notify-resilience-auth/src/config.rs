use crate::error::TokenError;
use crate::events::AuthEvent;
use crate::token::TemplateVerifier;
use notify_resilience_core::{Observers};
use std::time::Duration;

/// Configuration for the authenticating decorator.
pub struct AuthConfig {
    pub(crate) verifier: TemplateVerifier,
    pub(crate) observers: Observers<AuthEvent>,
    pub(crate) name: String,
}

impl AuthConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::new()
    }
}

/// Builder for [`AuthConfig`].
pub struct AuthConfigBuilder {
    secret: Vec<u8>,
    leeway: Duration,
    observers: Observers<AuthEvent>,
    name: String,
}

impl Default for AuthConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - secret: none (every token is rejected until one is set)
    /// - leeway: 0
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            secret: Vec::new(),
            leeway: Duration::ZERO,
            observers: Observers::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the shared HS256 secret tokens are verified against.
    pub fn secret(mut self, secret: impl AsRef<[u8]>) -> Self {
        self.secret = secret.as_ref().to_vec();
        self
    }

    /// Sets how long past its expiry a token is still accepted.
    pub fn leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Sets the name for this instance (used in events).
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a token verifies.
    ///
    /// # Callback Signature
    /// `Fn(&str)` - Called with the template id recovered from the token.
    pub fn on_verified<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let AuthEvent::Verified { template_id, .. } = event {
                f(template_id);
            }
        });
        self
    }

    /// Registers a callback when a token is rejected.
    ///
    /// # Example
    /// ```rust
    /// use notify_resilience_auth::AuthLayer;
    ///
    /// let layer = AuthLayer::builder()
    ///     .secret("s3cret")
    ///     .on_rejected(|error| eprintln!("rejected template token: {}", error))
    ///     .build();
    /// ```
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&TokenError) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let AuthEvent::Rejected { error, .. } = event {
                f(error);
            }
        });
        self
    }

    /// Builds the authentication layer.
    pub fn build(self) -> crate::AuthLayer {
        let config = AuthConfig {
            verifier: TemplateVerifier::with_leeway(&self.secret, self.leeway),
            observers: self.observers,
            name: self.name,
        };

        crate::AuthLayer::new(config)
    }
}
