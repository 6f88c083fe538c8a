//! Concurrent callers against one shared limit.

use super::{counting_provider, request};
use notify_resilience_core::{SendError, Sender};
use notify_resilience_ratelimiter::{RateLimiterLayer, SlidingWindowLimiter};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::Layer;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_never_exceed_rate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let sender = Arc::new(
        RateLimiterLayer::builder()
            .limiter(SlidingWindowLimiter::new(Duration::from_secs(60), 25))
            .build()
            .layer(counting_provider(Arc::clone(&calls))),
    );

    let mut handles = Vec::new();
    for _ in 0..100 {
        let sender = Arc::clone(&sender);
        handles.push(tokio::spawn(async move { sender.send(request()).await }));
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => admitted += 1,
            Err(SendError::RateLimitExceeded) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, 25);
    assert_eq!(rejected, 75);
    assert_eq!(calls.load(Ordering::SeqCst), 25);
}
