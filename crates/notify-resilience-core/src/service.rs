//! Adapter that mounts a [`Sender`] chain into a tower stack.

use crate::{SendError, SendRequest, Sender};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

/// A [`tower::Service`] that forwards every request to a [`Sender`].
///
/// Senders never apply backpressure through readiness, so `poll_ready` is
/// always ready.
///
/// ```
/// use notify_resilience_core::{sender_fn, SendError, SendRequest, SenderService};
/// use tower::{Service, ServiceExt};
///
/// # async fn example() {
/// let mut svc = SenderService::new(sender_fn(|_req: SendRequest| async { Ok::<_, SendError>(()) }));
/// let req = SendRequest::new("tpl", vec![], vec!["+1".into()]);
/// svc.ready().await.unwrap().call(req).await.unwrap();
/// # }
/// ```
pub struct SenderService<S> {
    inner: Arc<S>,
}

impl<S> SenderService<S> {
    /// Wraps a sender.
    pub fn new(inner: S) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the wrapped sender.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S> Clone for SenderService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Service<SendRequest> for SenderService<S>
where
    S: Sender + 'static,
{
    type Response = ();
    type Error = SendError;
    type Future = BoxFuture<'static, Result<(), SendError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SendRequest) -> Self::Future {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.send(req).await })
    }
}
