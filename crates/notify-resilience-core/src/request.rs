use crate::SendError;
use serde::{Deserialize, Serialize};

/// A single transactional message: which template to render, the template
/// arguments, and who receives it.
///
/// This is also the payload the durable queue persists, so it is
/// serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Template identifier. Above the authentication layer this is a signed
    /// token; below it, the provider's real template id.
    pub template_id: String,
    /// Ordered template arguments (e.g. the verification code).
    pub args: Vec<String>,
    /// Ordered recipient identifiers (e.g. E.164 phone numbers).
    pub recipients: Vec<String>,
}

impl SendRequest {
    /// Creates a new request.
    pub fn new(
        template_id: impl Into<String>,
        args: Vec<String>,
        recipients: Vec<String>,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            args,
            recipients,
        }
    }

    /// Returns a copy of this request addressed to a different template.
    pub fn with_template(&self, template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            args: self.args.clone(),
            recipients: self.recipients.clone(),
        }
    }

    /// Checks the request is structurally deliverable.
    ///
    /// A request needs a template and at least one non-empty recipient.
    pub fn validate(&self) -> Result<(), SendError> {
        if self.template_id.trim().is_empty() {
            return Err(SendError::InvalidRequest("template id is empty".into()));
        }
        if self.recipients.is_empty() {
            return Err(SendError::InvalidRequest("no recipients".into()));
        }
        if self.recipients.iter().any(|r| r.trim().is_empty()) {
            return Err(SendError::InvalidRequest("empty recipient".into()));
        }
        Ok(())
    }
}
