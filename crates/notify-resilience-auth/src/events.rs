use crate::error::TokenError;

/// Events emitted by the authenticating decorator.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// The token verified and the call was forwarded with the real template.
    Verified { template_id: String },
    /// The token was rejected; the inner sender was not called.
    Rejected { error: TokenError },
}
