use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Why a template token could not be issued or accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token's `exp` claim is in the past.
    #[error("template token expired")]
    Expired,

    /// The token was not signed with the configured secret.
    #[error("template token signature mismatch")]
    InvalidSignature,

    /// The token could not be parsed or is missing required claims.
    #[error("malformed template token: {0}")]
    Malformed(String),

    /// The token carries an empty template id.
    #[error("template token carries no template id")]
    MissingTemplate,

    /// No secret was configured, so no token can be trusted.
    #[error("no template signing secret configured")]
    MissingSecret,

    /// Signing failed.
    #[error("failed to sign template token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(error.to_string()),
        }
    }
}

impl From<TokenError> for notify_resilience_core::SendError {
    fn from(error: TokenError) -> Self {
        notify_resilience_core::SendError::Authentication(error.to_string())
    }
}
