use crate::window::LatencyWindow;
use crate::{AsyncSender, AsyncSenderConfig, AsyncSenderConfigBuilder};
use notify_resilience_queue::JobStore;
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that moves degraded or rate-limited sends onto a job
/// queue.
///
/// Every sender produced by one layer shares the layer's store, but each
/// gets its own latency window.
#[derive(Clone)]
pub struct AsyncLayer {
    config: Arc<AsyncSenderConfig>,
    store: Arc<dyn JobStore>,
}

impl AsyncLayer {
    /// Creates a new `AsyncLayer` with the given configuration and store.
    pub fn new(config: AsyncSenderConfig, store: Arc<dyn JobStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Creates a new builder for configuring an async layer.
    pub fn builder() -> AsyncSenderConfigBuilder {
        AsyncSenderConfigBuilder::new()
    }

    /// Returns the store queued jobs are written to.
    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub(crate) fn config(&self) -> &AsyncSenderConfig {
        &self.config
    }
}

impl<S> Layer<S> for AsyncLayer {
    type Service = AsyncSender<S>;

    fn layer(&self, sender: S) -> Self::Service {
        let window = Arc::new(LatencyWindow::new(self.config.window_capacity));
        AsyncSender::new(
            sender,
            Arc::clone(&self.store),
            window,
            Arc::clone(&self.config),
        )
    }
}
