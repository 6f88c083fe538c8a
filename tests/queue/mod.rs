
use notify_resilience_core::{ManualClock, SendRequest};
use notify_resilience_queue::MemoryJobStore;
use std::sync::Arc;

pub(crate) fn request(template: &str) -> SendRequest {
    SendRequest::new(template, vec!["123456".into()], vec!["+15550100".into()])
}

pub(crate) fn backoff() -> chrono::Duration {
    chrono::Duration::seconds(60)
}

pub(crate) fn store() -> (MemoryJobStore, ManualClock) {
    let clock = ManualClock::new();
    (MemoryJobStore::with_clock(Arc::new(clock.clone())), clock)
}
