use super::helpers::*;
use serial_test::serial;

use notify_resilience_async::AsyncLayer;
use notify_resilience_core::{SendError, SendRequest, Sender, sender_fn};
use notify_resilience_queue::MemoryJobStore;
use std::time::Duration;
use tower::Layer;

#[tokio::test]
#[serial]
async fn rate_limited_send_is_counted_as_enqueued() {
    install_recorder();

    let sender = AsyncLayer::builder()
        .name("limited_async")
        .build(MemoryJobStore::new())
        .layer(sender_fn(|_req: SendRequest| async {
            Err::<(), _>(SendError::RateLimitExceeded)
        }));

    sender.send(request()).await.unwrap();

    let recorded = recorded();
    assert_eq!(
        recorded.counter(
            "async_enqueued_total",
            &[("async", "limited_async"), ("reason", "rate_limited")]
        ),
        1
    );
    recorded.assert_histogram("async_send_duration_seconds", &[("async", "limited_async")]);
}

#[tokio::test(start_paused = true)]
#[serial]
async fn slow_mean_is_counted_as_degraded() {
    install_recorder();

    let sender = AsyncLayer::builder()
        .name("slow_async")
        .latency_threshold(Duration::from_millis(100))
        .build(MemoryJobStore::new())
        .layer(sender_fn(|_req: SendRequest| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, SendError>(())
        }));

    sender.send(request()).await.unwrap();

    let recorded = recorded();
    assert_eq!(
        recorded.counter(
            "async_enqueued_total",
            &[("async", "slow_async"), ("reason", "degraded")]
        ),
        1
    );
    assert!(recorded.is_missing(
        "async_enqueued_total",
        &[("async", "slow_async"), ("reason", "rate_limited")]
    ));
}
