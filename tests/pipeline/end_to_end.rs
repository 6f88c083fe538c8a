//! Single-step scenarios driven with a paused runtime and a manual clock.

use super::{SECRET, init_tracing, provider, request};
use notify_resilience::Pipeline;
use notify_resilience::r#async::{AsyncSenderConfig, RunOutcome};
use notify_resilience::core::{ManualClock, SendError, SendRequest, Sender, sender_fn};
use notify_resilience::failover::AdaptiveFailoverSender;
use notify_resilience::auth::{TemplateSigner, TemplateVerifier};
use notify_resilience::queue::JobStatus;
use notify_resilience::ratelimiter::{RateLimiterLayer, SlidingWindowLimiter};
use notify_resilience::timelimiter::TimeLimiterLayer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn slow_primary_fails_over_and_queue_drains_through_backup() {
    init_tracing();
    let clock = ManualClock::new();
    let primary_calls = Arc::new(AtomicUsize::new(0));
    let backup_calls = Arc::new(AtomicUsize::new(0));
    let switches = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&switches);

    let pipeline = Pipeline::builder()
        .secret(SECRET)
        .time_limiter(TimeLimiterLayer::new(Duration::from_secs(1)))
        .failover(
            AdaptiveFailoverSender::builder()
                .threshold(2)
                .on_switch(move |from, to| s.lock().unwrap().push((from, to))),
        )
        .provider(provider(Duration::from_secs(2), Arc::clone(&primary_calls)))
        .provider(provider(Duration::ZERO, Arc::clone(&backup_calls)))
        .clock(clock.clone())
        .build()
        .unwrap();

    // Two primary timeouts: both are slow enough to be queued
    assert_eq!(pipeline.send(request()).await, Ok(()));
    assert_eq!(pipeline.send(request()).await, Ok(()));
    assert_eq!(pipeline.failover().current_index(), 0);

    // Third call switches; the window mean (666ms) still queues it
    assert_eq!(pipeline.send(request()).await, Ok(()));
    assert_eq!(pipeline.failover().current_index(), 1);
    assert_eq!(*switches.lock().unwrap(), vec![(0, 1)]);

    // Window mean 333ms: passthrough
    assert_eq!(pipeline.send(request()).await, Ok(()));
    assert_eq!(backup_calls.load(Ordering::SeqCst), 2);
    assert_eq!(primary_calls.load(Ordering::SeqCst), 0);

    clock.advance(Duration::from_secs(61));
    for id in 1..=3 {
        assert_eq!(
            pipeline.consumer().run_once().await,
            RunOutcome::Processed { id, outcome: Ok(()) }
        );
    }
    assert_eq!(pipeline.consumer().run_once().await, RunOutcome::Idle);
    assert_eq!(backup_calls.load(Ordering::SeqCst), 5);

    for id in 1..=3 {
        assert_eq!(
            pipeline.store().get(id).await.unwrap().status,
            JobStatus::Success
        );
    }
}

#[tokio::test(start_paused = true)]
async fn expired_token_is_rejected_before_any_provider() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));

    let pipeline = Pipeline::builder()
        .secret(SECRET)
        .provider(provider(Duration::ZERO, Arc::clone(&calls)))
        .build()
        .unwrap();

    let expired = TemplateSigner::new(SECRET)
        .sign_until(
            "1263395",
            chrono::Utc::now() - chrono::Duration::minutes(10),
        )
        .unwrap();
    let result = pipeline
        .send(SendRequest::new(expired, vec![], vec!["+15550100".into()]))
        .await;

    assert!(matches!(result, Err(SendError::Authentication(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        pipeline.store().get(1).await,
        Err(notify_resilience::queue::StoreError::NotFound)
    );
}

#[tokio::test(start_paused = true)]
async fn job_fails_after_attempt_budget() {
    init_tracing();
    let clock = ManualClock::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let a = Arc::clone(&attempts);

    let pipeline = Pipeline::builder()
        .secret(SECRET)
        .async_sender(AsyncSenderConfig::builder().retry_max(2))
        .provider(sender_fn(move |_req: SendRequest| {
            a.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(SendError::RateLimitExceeded) }
        }))
        .clock(clock.clone())
        .build()
        .unwrap();

    // Provider-side throttling is queued just like local rate limiting
    assert_eq!(pipeline.send(request()).await, Ok(()));

    for attempt in 1..=2 {
        clock.advance(Duration::from_secs(61));
        assert_eq!(
            pipeline.consumer().run_once().await,
            RunOutcome::Processed {
                id: 1,
                outcome: Err(SendError::RateLimitExceeded)
            },
            "attempt {}",
            attempt
        );
    }

    let job = pipeline.store().get(1).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.retry_count, 2);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    clock.advance(Duration::from_secs(61));
    assert_eq!(pipeline.consumer().run_once().await, RunOutcome::Idle);
}

#[tokio::test]
async fn queued_job_outlives_its_token() {
    init_tracing();
    let clock = ManualClock::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let pipeline = Pipeline::builder()
        .secret(SECRET)
        .rate_limiter(
            RateLimiterLayer::builder()
                .limiter(SlidingWindowLimiter::new(Duration::from_secs(60), 0))
                .build(),
        )
        .provider(provider(Duration::ZERO, Arc::clone(&calls)))
        .clock(clock.clone())
        .build()
        .unwrap();

    let token = TemplateSigner::new(SECRET)
        .sign("1263395", Duration::from_secs(1))
        .unwrap();
    let result = pipeline
        .send(SendRequest::new(
            token.clone(),
            vec!["123456".into()],
            vec!["+15550100".into()],
        ))
        .await;
    assert_eq!(result, Ok(()));

    // The job holds the resolved template, not the token
    let job = pipeline.store().get(1).await.unwrap();
    assert_eq!(job.request.template_id, "1263395");

    tokio::time::sleep(Duration::from_millis(2_100)).await;
    assert!(TemplateVerifier::new(SECRET).verify(&token).is_err());

    clock.advance(Duration::from_secs(61));
    assert_eq!(
        pipeline.consumer().run_once().await,
        RunOutcome::Processed { id: 1, outcome: Ok(()) }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        pipeline.store().get(1).await.unwrap().status,
        JobStatus::Success
    );
}
