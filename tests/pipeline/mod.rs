mod end_to_end;

use notify_resilience::auth::TemplateSigner;
use notify_resilience::core::{SendError, SendRequest, Sender, sender_fn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub(crate) const SECRET: &str = "end-to-end-secret";

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

pub(crate) fn request() -> SendRequest {
    let token = TemplateSigner::new(SECRET)
        .sign("1263395", Duration::from_secs(300))
        .unwrap();
    SendRequest::new(token, vec!["123456".into()], vec!["+15550100".into()])
}

/// A provider that sleeps `latency` per call and counts completed calls.
pub(crate) fn provider(latency: Duration, calls: Arc<AtomicUsize>) -> impl Sender {
    sender_fn(move |_req: SendRequest| {
        let calls = Arc::clone(&calls);
        async move {
            tokio::time::sleep(latency).await;
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, SendError>(())
        }
    })
}
