//! The single-method capability every provider and decorator implements.

use crate::{SendError, SendRequest};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Something that can deliver a [`SendRequest`].
///
/// Providers implement this directly; decorators implement it by holding
/// the next sender as a field and delegating to it. Because the trait has a
/// single method and is object safe, provider lists are plain
/// `Vec<Arc<dyn Sender>>`.
pub trait Sender: Send + Sync {
    /// Delivers the request, or explains why it could not.
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>>;
}

impl<S> Sender for Arc<S>
where
    S: Sender + ?Sized,
{
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        (**self).send(request)
    }
}

impl<S> Sender for Box<S>
where
    S: Sender + ?Sized,
{
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        (**self).send(request)
    }
}

impl<S> Sender for &S
where
    S: Sender + ?Sized,
{
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        (**self).send(request)
    }
}

/// A [`Sender`] backed by a closure. See [`sender_fn`].
#[derive(Clone)]
pub struct SenderFn<F> {
    f: F,
}

/// Builds a [`Sender`] from an async closure.
///
/// ```
/// use notify_resilience_core::{sender_fn, SendError, SendRequest};
///
/// let always_down = sender_fn(|_req: SendRequest| async {
///     Err::<(), _>(SendError::provider("gateway unreachable"))
/// });
/// ```
pub fn sender_fn<F, Fut>(f: F) -> SenderFn<F>
where
    F: Fn(SendRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), SendError>> + Send + 'static,
{
    SenderFn { f }
}

impl<F, Fut> Sender for SenderFn<F>
where
    F: Fn(SendRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), SendError>> + Send + 'static,
{
    fn send(&self, request: SendRequest) -> BoxFuture<'_, Result<(), SendError>> {
        Box::pin((self.f)(request))
    }
}
