//! The background consumer draining what the orchestrator queued.

use super::{request, scripted};
use notify_resilience_async::{AsyncLayer, Consumer, ConsumerConfig, RunOutcome};
use notify_resilience_core::{ManualClock, SendError, SendRequest, Sender, sender_fn};
use notify_resilience_queue::{JobStatus, JobStore, MemoryJobStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::Layer;

#[tokio::test(start_paused = true)]
async fn queued_send_is_delivered_after_backoff_window() {
    let clock = ManualClock::new();
    let store = MemoryJobStore::with_clock(Arc::new(clock.clone()));
    let delivered = Arc::new(AtomicUsize::new(0));
    let d = Arc::clone(&delivered);

    let sender = AsyncLayer::builder()
        .build(store.clone())
        .layer(scripted(vec![(1, Err(SendError::RateLimitExceeded))]));
    let consumer = Consumer::new(
        sender_fn(move |_req: SendRequest| {
            d.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, SendError>(()) }
        }),
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        ConsumerConfig::default(),
    );

    sender.send(request()).await.unwrap();
    assert_eq!(consumer.run_once().await, RunOutcome::Idle);

    clock.advance(Duration::from_secs(61));
    assert!(matches!(
        consumer.run_once().await,
        RunOutcome::Processed { outcome: Ok(()), .. }
    ));
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
    assert_eq!(store.count_by_status(JobStatus::Success).await, 1);
}

#[tokio::test]
async fn backoff_window_is_configurable() {
    let clock = ManualClock::new();
    let store = MemoryJobStore::with_clock(Arc::new(clock.clone()));
    store
        .insert(notify_resilience_queue::NewJob::new(request(), 3))
        .await
        .unwrap();

    let consumer = Consumer::new(
        sender_fn(|_req: SendRequest| async { Ok::<_, SendError>(()) }),
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        ConsumerConfig::builder()
            .backoff_window(Duration::from_secs(5))
            .build(),
    );

    clock.advance(Duration::from_secs(6));
    assert!(matches!(
        consumer.run_once().await,
        RunOutcome::Processed { .. }
    ));
}

#[tokio::test]
async fn running_consumer_retries_until_success() {
    let clock = ManualClock::new();
    let store = MemoryJobStore::with_clock(Arc::new(clock.clone()));
    let job = store
        .insert(notify_resilience_queue::NewJob::new(request(), 5))
        .await
        .unwrap();

    let attempts = Arc::new(AtomicUsize::new(0));
    let a = Arc::clone(&attempts);
    let flaky = sender_fn(move |_req: SendRequest| {
        let attempt = a.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if attempt < 3 {
                Err(SendError::provider("gateway 502"))
            } else {
                Ok(())
            }
        }
    });

    let handle = Consumer::new(
        flaky,
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        ConsumerConfig::builder().name("retrying").build(),
    )
    .start();

    for _ in 0..500 {
        if store.get(job.id).await.unwrap().status == JobStatus::Success {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    handle.shutdown().await;

    let stored = store.get(job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Success);
    assert_eq!(stored.retry_count, 3);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn two_consumers_never_deliver_a_job_twice() {
    let clock = ManualClock::new();
    let store = MemoryJobStore::with_clock(Arc::new(clock.clone()));
    for _ in 0..10 {
        store
            .insert(notify_resilience_queue::NewJob::new(request(), 3))
            .await
            .unwrap();
    }

    let deliveries = Arc::new(AtomicUsize::new(0));
    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let d = Arc::clone(&deliveries);
            Consumer::new(
                sender_fn(move |_req: SendRequest| {
                    d.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, SendError>(()) }
                }),
                Arc::new(store.clone()),
                Arc::new(clock.clone()),
                ConsumerConfig::default(),
            )
            .start()
        })
        .collect();

    for _ in 0..500 {
        if store.count_by_status(JobStatus::Success).await == 10 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    for handle in consumers {
        handle.shutdown().await;
    }

    assert_eq!(store.count_by_status(JobStatus::Success).await, 10);
    assert_eq!(deliveries.load(Ordering::SeqCst), 10);
}
