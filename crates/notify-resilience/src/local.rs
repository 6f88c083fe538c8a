use futures::future::BoxFuture;
use notify_resilience_core::{SendError, SendRequest, Sender};
use tracing::info;

/// A provider that logs instead of sending.
///
/// Useful in development and as the last entry of a provider list in
/// environments without gateway credentials. Every call succeeds.
#[derive(Debug, Clone, Default)]
pub struct LocalSender {
    name: String,
}

impl LocalSender {
    /// Creates a local provider named `"local"`.
    pub fn new() -> Self {
        Self::named("local")
    }

    /// Creates a local provider with the given name (used in logs).
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The provider name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Sender for LocalSender {
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        Box::pin(async move {
            request.validate()?;

            info!(
                provider = %self.name,
                template_id = %request.template_id,
                args = ?request.args,
                recipients = ?request.recipients,
                "local send"
            );
            Ok(())
        })
    }
}
