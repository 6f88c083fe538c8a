use crate::config::{FailoverConfig, RoundRobinBuilder};
use crate::events::FailoverEvent;
use futures::future::BoxFuture;
use notify_resilience_core::{SendError, SendRequest, Sender};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Tries every provider in list order until one succeeds.
///
/// Holds no state between calls. When every provider fails the call fails
/// with [`SendError::AllProvidersFailed`], carrying each provider's error in
/// list order.
#[derive(Clone)]
pub struct RoundRobinSender {
    providers: Arc<[Arc<dyn Sender>]>,
    config: Arc<FailoverConfig>,
}

impl RoundRobinSender {
    pub(crate) fn new(providers: Vec<Arc<dyn Sender>>, config: Arc<FailoverConfig>) -> Self {
        Self {
            providers: providers.into(),
            config,
        }
    }

    /// Creates a new builder.
    pub fn builder() -> RoundRobinBuilder {
        RoundRobinBuilder::new()
    }

    /// Number of providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}

impl Sender for RoundRobinSender {
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        Box::pin(async move {
            let mut failures = Vec::with_capacity(self.providers.len());

            for (index, provider) in self.providers.iter().enumerate() {
                match provider.send(request.clone()).await {
                    Ok(()) => {
                        self.config.observers.notify(&FailoverEvent::Success { provider: index });
                        return Ok(());
                    }
                    Err(error) => {
                        #[cfg(feature = "tracing")]
                        warn!(
                            failover = %self.config.name,
                            provider = index,
                            error = %error,
                            "provider failed, trying next"
                        );

                        self.config.observers.notify(&FailoverEvent::ProviderFailed {
                            provider: index,
                            error: error.clone(),
                        });
                        failures.push(error);
                    }
                }
            }

            Err(SendError::AllProvidersFailed { failures })
        })
    }
}
