//! Authentication errors are fatal for every decorator around them.

use notify_resilience_async::AsyncLayer;
use notify_resilience_auth::{AuthLayer, TemplateSigner};
use notify_resilience_core::{SendError, SendRequest, Sender, sender_fn};
use notify_resilience_failover::RoundRobinSender;
use notify_resilience_queue::MemoryJobStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::Layer;

#[tokio::test]
async fn authentication_failure_is_not_queued_or_failed_over() {
    let calls = Arc::new(AtomicUsize::new(0));
    let providers: Vec<Arc<dyn Sender>> = (0..2)
        .map(|_| {
            let calls = Arc::clone(&calls);
            Arc::new(sender_fn(move |_req: SendRequest| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, SendError>(()) }
            })) as Arc<dyn Sender>
        })
        .collect();

    let store = MemoryJobStore::new();
    let sender = AsyncLayer::builder()
        .latency_threshold(Duration::ZERO)
        .build(store.clone())
        .layer(
            AuthLayer::builder()
                .secret("real-secret")
                .build()
                .layer(RoundRobinSender::builder().build(providers).unwrap()),
        );

    let forged = TemplateSigner::new("wrong-secret")
        .sign("1263395", Duration::from_secs(60))
        .unwrap();
    let result = sender
        .send(SendRequest::new(forged, vec![], vec!["+15550100".into()]))
        .await;

    // A zero threshold marks every send as degraded, yet the auth failure
    // still surfaces unchanged.
    assert!(matches!(result, Err(SendError::Authentication(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(store.jobs().await.is_empty());
}
