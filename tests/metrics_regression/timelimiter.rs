use super::helpers::*;
use serial_test::serial;

use notify_resilience_core::{SendError, SendRequest, Sender, sender_fn};
use notify_resilience_timelimiter::TimeLimiterLayer;
use std::time::Duration;
use tower::Layer;

#[tokio::test]
#[serial]
async fn completed_call_records_outcome_and_duration() {
    install_recorder();

    let sender = TimeLimiterLayer::builder()
        .name("provider_deadline")
        .deadline(Duration::from_secs(1))
        .build()
        .layer(sender_fn(|_req: SendRequest| async { Ok::<_, SendError>(()) }));

    sender.send(request()).await.unwrap();

    let recorded = recorded();
    assert_eq!(
        recorded.counter(
            "timelimiter_calls_total",
            &[("timelimiter", "provider_deadline"), ("result", "success")]
        ),
        1
    );
    recorded.assert_histogram(
        "timelimiter_call_duration_seconds",
        &[("timelimiter", "provider_deadline")],
    );
}

#[tokio::test(start_paused = true)]
#[serial]
async fn expired_call_is_counted_without_a_duration() {
    install_recorder();

    let sender = TimeLimiterLayer::builder()
        .name("tight_deadline")
        .deadline(Duration::from_millis(10))
        .build()
        .layer(sender_fn(|_req: SendRequest| async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, SendError>(())
        }));

    assert_eq!(sender.send(request()).await, Err(SendError::Timeout));

    let recorded = recorded();
    assert_eq!(
        recorded.counter(
            "timelimiter_calls_total",
            &[("timelimiter", "tight_deadline"), ("result", "timeout")]
        ),
        1
    );
    assert!(recorded.is_missing(
        "timelimiter_call_duration_seconds",
        &[("timelimiter", "tight_deadline")]
    ));
}
