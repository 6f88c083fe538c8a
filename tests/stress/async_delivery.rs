//! Async delivery stress tests

use notify_resilience_async::{AsyncLayer, Consumer, ConsumerConfig};
use notify_resilience_core::{ManualClock, SendError, SendRequest, Sender, sender_fn};
use notify_resilience_queue::{JobStatus, MemoryJobStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tower::Layer;

use super::request;

/// Test: a fully rate-limited burst is queued and drained by several
/// consumers with no loss and no duplicates
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_burst_queued_and_drained() {
    let clock = ManualClock::new();
    let store = MemoryJobStore::with_clock(Arc::new(clock.clone()));
    let sender = AsyncLayer::builder()
        .build(store.clone())
        .layer(sender_fn(|_req: SendRequest| async {
            Err::<(), _>(SendError::RateLimitExceeded)
        }));

    let start = Instant::now();
    for i in 0..10_000 {
        assert_eq!(sender.send(request(i)).await, Ok(()));
    }
    println!("10k sends queued in {:?}", start.elapsed());

    // Jobs become eligible at once; tiny idle sleeps keep the manual clock
    // far from re-opening a claim that is still being delivered.
    clock.advance(Duration::from_secs(61));
    let delivered = Arc::new(AtomicUsize::new(0));
    let consumers: Vec<_> = (0..8)
        .map(|_| {
            let d = Arc::clone(&delivered);
            Consumer::new(
                sender_fn(move |_req: SendRequest| {
                    d.fetch_add(1, Ordering::Relaxed);
                    async { Ok::<_, SendError>(()) }
                }),
                Arc::new(store.clone()),
                Arc::new(clock.clone()),
                ConsumerConfig::builder()
                    .idle_backoff(Duration::from_millis(1))
                    .build(),
            )
            .start()
        })
        .collect();

    let drain = Instant::now();
    while store.count_by_status(JobStatus::Success).await < 10_000 {
        assert!(drain.elapsed() < Duration::from_secs(60), "drain stalled");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    for handle in consumers {
        handle.shutdown().await;
    }

    println!("10k jobs drained by 8 consumers in {:?}", drain.elapsed());
    assert_eq!(delivered.load(Ordering::Relaxed), 10_000);
}
