use crate::adaptive::AdaptiveFailoverSender;
use crate::error::FailoverError;
use crate::events::FailoverEvent;
use crate::round_robin::RoundRobinSender;
use notify_resilience_core::{Observers, SendError, Sender};
use std::sync::Arc;

/// Shared configuration for a failover sender.
pub struct FailoverConfig {
    pub(crate) observers: Observers<FailoverEvent>,
    pub(crate) name: String,
}

/// Builder for [`AdaptiveFailoverSender`].
pub struct AdaptiveFailoverBuilder {
    threshold: u32,
    initial_timeouts: u32,
    observers: Observers<FailoverEvent>,
    name: String,
}

impl Default for AdaptiveFailoverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveFailoverBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - threshold: 5 consecutive timeouts
    /// - initial_timeouts: 0
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            threshold: 5,
            initial_timeouts: 0,
            observers: Observers::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets how many consecutive timeouts move traffic to the next provider.
    ///
    /// A threshold of 0 switches provider on every call.
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Primes the consecutive-timeout counter.
    ///
    /// Setting this at or above the threshold makes the very first call
    /// switch away from provider 0.
    pub fn initial_timeouts(mut self, count: u32) -> Self {
        self.initial_timeouts = count;
        self
    }

    /// Sets the name for this instance (used in events and metrics).
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when traffic moves to another provider.
    ///
    /// # Callback Signature
    /// `Fn(usize, usize)` - the previous and the new provider index.
    pub fn on_switch<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let FailoverEvent::Switched { from, to, .. } = event {
                f(*from, *to);
            }
        });
        self
    }

    /// Registers a callback when a provider times out.
    ///
    /// # Callback Signature
    /// `Fn(usize, u32)` - the provider index and the consecutive timeout count.
    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, u32) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let FailoverEvent::Timeout {
                provider,
                consecutive,
                ..
            } = event
            {
                f(*provider, *consecutive);
            }
        });
        self
    }

    /// Registers a callback when a provider succeeds.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let FailoverEvent::Success { provider, .. } = event {
                f(*provider);
            }
        });
        self
    }

    /// Builds the sender over the given providers, in priority order.
    pub fn build<I>(self, providers: I) -> Result<AdaptiveFailoverSender, FailoverError>
    where
        I: IntoIterator<Item = Arc<dyn Sender>>,
    {
        let providers: Vec<_> = providers.into_iter().collect();
        if providers.is_empty() {
            return Err(FailoverError::NoProviders);
        }

        let config = FailoverConfig {
            observers: self.observers,
            name: self.name,
        };

        Ok(AdaptiveFailoverSender::new(
            providers,
            Arc::new(config),
            self.threshold,
            self.initial_timeouts,
        ))
    }
}

/// Builder for [`RoundRobinSender`].
pub struct RoundRobinBuilder {
    observers: Observers<FailoverEvent>,
    name: String,
}

impl Default for RoundRobinBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundRobinBuilder {
    /// Creates a new builder. The default name is `"<unnamed>"`.
    pub fn new() -> Self {
        Self {
            observers: Observers::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the name for this instance (used in events and logs).
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback for every individual provider failure.
    pub fn on_provider_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, &SendError) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let FailoverEvent::ProviderFailed {
                provider, error, ..
            } = event
            {
                f(*provider, error);
            }
        });
        self
    }

    /// Registers a callback when a provider delivers the message.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.observers.push(move |event| {
            if let FailoverEvent::Success { provider, .. } = event {
                f(*provider);
            }
        });
        self
    }

    /// Builds the sender over the given providers, tried in order.
    pub fn build<I>(self, providers: I) -> Result<RoundRobinSender, FailoverError>
    where
        I: IntoIterator<Item = Arc<dyn Sender>>,
    {
        let providers: Vec<_> = providers.into_iter().collect();
        if providers.is_empty() {
            return Err(FailoverError::NoProviders);
        }

        let config = FailoverConfig {
            observers: self.observers,
            name: self.name,
        };

        Ok(RoundRobinSender::new(providers, Arc::new(config)))
    }
}
