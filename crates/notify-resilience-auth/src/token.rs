//! Signed template tokens.
//!
//! Callers never name a provider template directly. A trusted issuer signs
//! the real template id into a short-lived HS256 token and the caller passes
//! that token where the template id would go. The token carries two claims:
//!
//! - `tpl`: the real template id
//! - `exp`: expiry, seconds since the Unix epoch

use crate::error::TokenError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claims carried by a template token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateClaims {
    /// The provider template id the token authorizes.
    pub tpl: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

/// Issues template tokens.
#[derive(Clone)]
pub struct TemplateSigner {
    key: EncodingKey,
}

impl TemplateSigner {
    /// Creates a signer for the given shared secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Signs `template_id` into a token valid for `ttl`.
    pub fn sign(&self, template_id: &str, ttl: Duration) -> Result<String, TokenError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;
        self.sign_until(template_id, Utc::now() + ttl)
    }

    /// Signs `template_id` into a token that expires at `expires_at`.
    pub fn sign_until(
        &self,
        template_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if template_id.trim().is_empty() {
            return Err(TokenError::MissingTemplate);
        }

        let claims = TemplateClaims {
            tpl: template_id.to_string(),
            exp: expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

/// Checks template tokens and recovers the template id they carry.
#[derive(Clone)]
pub struct TemplateVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TemplateVerifier {
    /// Creates a verifier for the given shared secret with no expiry leeway.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self::with_leeway(secret, Duration::ZERO)
    }

    /// Creates a verifier that accepts tokens up to `leeway` past expiry.
    pub fn with_leeway(secret: impl AsRef<[u8]>, leeway: Duration) -> Self {
        let secret = secret.as_ref();
        let key = if secret.is_empty() {
            None
        } else {
            Some(DecodingKey::from_secret(secret))
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway.as_secs();
        validation.validate_exp = true;

        Self { key, validation }
    }

    /// Verifies `token` and returns the template id it carries.
    ///
    /// A verifier built without a secret rejects every token.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let key = self.key.as_ref().ok_or(TokenError::MissingSecret)?;
        let data = jsonwebtoken::decode::<TemplateClaims>(token, key, &self.validation)?;

        if data.claims.tpl.trim().is_empty() {
            return Err(TokenError::MissingTemplate);
        }
        Ok(data.claims.tpl)
    }
}
