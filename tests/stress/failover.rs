//! Failover stress tests

use notify_resilience_core::{SendError, SendRequest, Sender, sender_fn};
use notify_resilience_failover::{AdaptiveFailoverSender, RoundRobinSender};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use super::request;

/// Test: 500k sends through a healthy adaptive breaker
#[tokio::test]
#[ignore]
async fn stress_adaptive_high_volume() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let provider: Arc<dyn Sender> = Arc::new(sender_fn(move |_req: SendRequest| {
        c.fetch_add(1, Ordering::Relaxed);
        async { Ok::<_, SendError>(()) }
    }));

    let sender = AdaptiveFailoverSender::builder().build([provider]).unwrap();

    let start = Instant::now();
    for i in 0..500_000 {
        sender.send(request(i)).await.unwrap();
    }
    let elapsed = start.elapsed();

    println!("500k sends completed in {:?}", elapsed);
    println!(
        "Throughput: {:.0} sends/sec",
        500_000.0 / elapsed.as_secs_f64()
    );

    assert_eq!(calls.load(Ordering::Relaxed), 500_000);
    assert_eq!(sender.current_index(), 0);
}

/// Test: concurrent timeouts from many tasks never leave the breaker on an
/// out-of-range provider, and every call lands on some provider
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_adaptive_concurrent_switching() {
    let per_provider: Arc<Vec<AtomicUsize>> = Arc::new((0..4).map(|_| AtomicUsize::new(0)).collect());
    let switches = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&switches);

    let providers: Vec<Arc<dyn Sender>> = (0..4)
        .map(|index| {
            let per_provider = Arc::clone(&per_provider);
            Arc::new(sender_fn(move |_req: SendRequest| {
                per_provider[index].fetch_add(1, Ordering::Relaxed);
                async { Err::<(), _>(SendError::Timeout) }
            })) as Arc<dyn Sender>
        })
        .collect();

    let sender = AdaptiveFailoverSender::builder()
        .threshold(5)
        .on_switch(move |_, _| {
            s.fetch_add(1, Ordering::Relaxed);
        })
        .build(providers)
        .unwrap();

    let start = Instant::now();
    let mut handles = Vec::new();
    for task in 0..100 {
        let sender = sender.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..1_000 {
                let _ = sender.send(request(task * 1_000 + i)).await;
                assert!(sender.current_index() < 4);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    let elapsed = start.elapsed();

    let total: usize = per_provider.iter().map(|c| c.load(Ordering::Relaxed)).sum();
    println!("100k concurrent timeouts in {:?}", elapsed);
    println!("Switches: {}", switches.load(Ordering::Relaxed));
    for (index, count) in per_provider.iter().enumerate() {
        println!("  provider {}: {} calls", index, count.load(Ordering::Relaxed));
    }

    assert_eq!(total, 100_000);
    assert!(switches.load(Ordering::Relaxed) > 0);
    // Every provider should have taken traffic as the breaker rotated
    assert!(per_provider.iter().all(|c| c.load(Ordering::Relaxed) > 0));
}

/// Test: round robin over mostly failing providers under concurrency
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_round_robin_concurrent() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let providers: Vec<Arc<dyn Sender>> = (0..5)
        .map(|index| {
            let attempts = Arc::clone(&attempts);
            Arc::new(sender_fn(move |_req: SendRequest| {
                attempts.fetch_add(1, Ordering::Relaxed);
                async move {
                    if index == 4 {
                        Ok(())
                    } else {
                        Err(SendError::provider("503"))
                    }
                }
            })) as Arc<dyn Sender>
        })
        .collect();

    let sender = Arc::new(RoundRobinSender::builder().build(providers).unwrap());

    let start = Instant::now();
    let mut handles = Vec::new();
    for task in 0..50 {
        let sender = Arc::clone(&sender);
        handles.push(tokio::spawn(async move {
            for i in 0..2_000 {
                sender.send(request(task * 2_000 + i)).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    println!("100k round robin sends in {:?}", start.elapsed());
    assert_eq!(attempts.load(Ordering::Relaxed), 500_000);
}
