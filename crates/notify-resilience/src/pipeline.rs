//! The assembled production chain.
//!
//! ```text
//! AuthenticatedSender
//!   └─ AsyncSender
//!        └─ RateLimitedSender
//!             └─ AdaptiveFailoverSender ◄──── Consumer (drains the job store)
//!                  ├─ TimeLimitedSender(provider 0)
//!                  ├─ TimeLimitedSender(provider 1)
//!                  └─ ...
//! ```
//!
//! Tokens are resolved before anything else runs, so a forged or expired
//! token is rejected even when the send would have been queued, and queued
//! jobs carry the real template id rather than a token that may expire
//! while they wait. The consumer is bound below the rate limiter, so a
//! queued delivery is neither rate limited a second time nor queued again.

use futures::future::BoxFuture;
use notify_resilience_async::{
    AsyncLayer, AsyncSender, AsyncSenderConfigBuilder, Consumer, ConsumerConfig, ConsumerHandle,
};
use notify_resilience_auth::{AuthLayer, AuthenticatedSender};
use notify_resilience_core::{Clock, SendError, SendRequest, Sender, SystemClock};
use notify_resilience_failover::{AdaptiveFailoverBuilder, AdaptiveFailoverSender, FailoverError};
use notify_resilience_queue::{JobStore, MemoryJobStore};
use notify_resilience_ratelimiter::{RateLimitedSender, RateLimiterLayer};
use notify_resilience_timelimiter::TimeLimiterLayer;
use std::sync::Arc;
use thiserror::Error;
use tower::Layer;

/// The outermost sender of a [`Pipeline`].
pub type PipelineSender =
    AuthenticatedSender<AsyncSender<RateLimitedSender<Arc<AdaptiveFailoverSender>>>>;

/// Errors from [`PipelineBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The provider list was empty.
    #[error(transparent)]
    Failover(#[from] FailoverError),

    /// Neither a template secret nor an auth layer was configured.
    #[error("no template secret configured")]
    MissingAuth,
}

/// Builder for [`Pipeline`].
pub struct PipelineBuilder {
    providers: Vec<Arc<dyn Sender>>,
    rate_limiter: Option<RateLimiterLayer>,
    auth: Option<AuthLayer>,
    time_limiter: Option<TimeLimiterLayer>,
    failover: AdaptiveFailoverBuilder,
    async_sender: AsyncSenderConfigBuilder,
    consumer: Option<ConsumerConfig>,
    store: Option<Arc<dyn JobStore>>,
    clock: Arc<dyn Clock>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - rate limiter: 1000 sends per second
    /// - time limiter: 1s per provider call
    /// - failover: switch after 5 consecutive timeouts
    /// - async: 500ms mean over the last 3 sends, 3 attempts per job
    /// - store: [`MemoryJobStore`]
    /// - clock: [`SystemClock`]
    ///
    /// There is no default template secret and no default provider.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            rate_limiter: None,
            auth: None,
            time_limiter: None,
            failover: AdaptiveFailoverBuilder::new(),
            async_sender: AsyncSenderConfigBuilder::new(),
            consumer: None,
            store: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Appends a provider. Providers are tried in the order added.
    pub fn provider<S>(mut self, provider: S) -> Self
    where
        S: Sender + 'static,
    {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Appends several providers.
    pub fn providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Sender>>,
    {
        self.providers.extend(providers);
        self
    }

    /// Verifies template tokens against `secret` with default auth settings.
    pub fn secret(mut self, secret: impl AsRef<[u8]>) -> Self {
        self.auth = Some(AuthLayer::builder().secret(secret).build());
        self
    }

    /// Uses a fully configured auth layer.
    pub fn auth(mut self, layer: AuthLayer) -> Self {
        self.auth = Some(layer);
        self
    }

    /// Uses a fully configured rate limiter layer.
    pub fn rate_limiter(mut self, layer: RateLimiterLayer) -> Self {
        self.rate_limiter = Some(layer);
        self
    }

    /// Bounds every provider call with this time limiter.
    pub fn time_limiter(mut self, layer: TimeLimiterLayer) -> Self {
        self.time_limiter = Some(layer);
        self
    }

    /// Configures the adaptive failover over the providers.
    pub fn failover(mut self, builder: AdaptiveFailoverBuilder) -> Self {
        self.failover = builder;
        self
    }

    /// Configures the async decorator.
    pub fn async_sender(mut self, builder: AsyncSenderConfigBuilder) -> Self {
        self.async_sender = builder;
        self
    }

    /// Configures the background consumer.
    pub fn consumer(mut self, config: ConsumerConfig) -> Self {
        self.consumer = Some(config);
        self
    }

    /// Sets the job store shared by the async decorator and the consumer.
    pub fn store<J>(mut self, store: J) -> Self
    where
        J: JobStore + 'static,
    {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets the clock driving the consumer and the default store.
    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Assembles the chain.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingAuth`] without a secret or auth layer
    /// and [`PipelineError::Failover`] without providers.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        let auth = self.auth.ok_or(PipelineError::MissingAuth)?;
        let time_limiter = self.time_limiter.unwrap_or_default();

        let providers = self
            .providers
            .into_iter()
            .map(|provider| Arc::new(time_limiter.layer(provider)) as Arc<dyn Sender>);
        let failover = Arc::new(self.failover.build(providers)?);

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryJobStore::with_clock(Arc::clone(&self.clock))));
        let rate_limiter = self
            .rate_limiter
            .unwrap_or_else(|| RateLimiterLayer::builder().build());
        let async_layer: AsyncLayer = self.async_sender.build(Arc::clone(&store));

        let sender = auth.layer(async_layer.layer(rate_limiter.layer(Arc::clone(&failover))));
        let consumer = Consumer::new(
            failover,
            Arc::clone(&store),
            self.clock,
            self.consumer.unwrap_or_default(),
        );

        Ok(Pipeline {
            sender,
            consumer,
            store,
        })
    }
}

/// A ready-to-use delivery chain and the consumer that drains its queue.
///
/// The consumer does not run until [`Pipeline::start`] is called.
///
/// # Examples
///
/// ```
/// use notify_resilience::{LocalSender, Pipeline};
/// use notify_resilience::auth::TemplateSigner;
/// use notify_resilience::core::{SendRequest, Sender};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = Pipeline::builder()
///     .secret("shared-secret")
///     .provider(LocalSender::new())
///     .build()?
///     .start();
///
/// let token = TemplateSigner::new("shared-secret").sign("1263395", Duration::from_secs(300))?;
/// pipeline
///     .send(SendRequest::new(token, vec!["123456".into()], vec!["+15550100".into()]))
///     .await?;
///
/// pipeline.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    sender: PipelineSender,
    consumer: Consumer<Arc<AdaptiveFailoverSender>>,
    store: Arc<dyn JobStore>,
}

impl Pipeline {
    /// Creates a new builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The outermost sender.
    pub fn sender(&self) -> &PipelineSender {
        &self.sender
    }

    /// The consumer, for driving single iterations by hand.
    pub fn consumer(&self) -> &Consumer<Arc<AdaptiveFailoverSender>> {
        &self.consumer
    }

    /// The job store queued sends are written to.
    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// The adaptive failover over the providers.
    pub fn failover(&self) -> &AdaptiveFailoverSender {
        self.sender.get_ref().get_ref().get_ref()
    }

    /// Starts the consumer loop.
    pub fn start(self) -> RunningPipeline {
        RunningPipeline {
            sender: self.sender,
            store: self.store,
            handle: self.consumer.start(),
        }
    }
}

impl Sender for Pipeline {
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        self.sender.send(request)
    }
}

/// A [`Pipeline`] whose consumer is running.
pub struct RunningPipeline {
    sender: PipelineSender,
    store: Arc<dyn JobStore>,
    handle: ConsumerHandle,
}

impl RunningPipeline {
    /// The outermost sender.
    pub fn sender(&self) -> &PipelineSender {
        &self.sender
    }

    /// The job store queued sends are written to.
    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Stops the consumer and waits for it to exit.
    pub async fn shutdown(self) {
        self.handle.shutdown().await;
    }
}

impl Sender for RunningPipeline {
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        self.sender.send(request)
    }
}
