//! Stateless round-robin over a provider list.

use super::{provider, request};
use notify_resilience_core::{SendError, Sender};
use notify_resilience_failover::{FailoverError, RoundRobinSender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn third_provider_rescues_the_call() {
    let calls: Vec<_> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let winner = Arc::new(Mutex::new(None));
    let w = Arc::clone(&winner);

    let sender = RoundRobinSender::builder()
        .on_success(move |index| *w.lock().unwrap() = Some(index))
        .build([
            provider(Err(SendError::provider("503")), Arc::clone(&calls[0])),
            provider(Err(SendError::Timeout), Arc::clone(&calls[1])),
            provider(Ok(()), Arc::clone(&calls[2])),
        ])
        .unwrap();

    assert_eq!(sender.send(request()).await, Ok(()));
    assert_eq!(*winner.lock().unwrap(), Some(2));
    for count in &calls {
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn every_failure_is_reported_in_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let sender = RoundRobinSender::builder()
        .build([
            provider(Err(SendError::provider("503")), Arc::clone(&calls)),
            provider(Err(SendError::Timeout), Arc::clone(&calls)),
            provider(Err(SendError::provider("quota")), Arc::clone(&calls)),
        ])
        .unwrap();

    assert_eq!(
        sender.send(request()).await,
        Err(SendError::AllProvidersFailed {
            failures: vec![
                SendError::provider("503"),
                SendError::Timeout,
                SendError::provider("quota"),
            ]
        })
    );
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn later_providers_untouched_after_success() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let sender = RoundRobinSender::builder()
        .build([
            provider(Ok(()), Arc::clone(&first)),
            provider(Ok(()), Arc::clone(&second)),
        ])
        .unwrap();

    for _ in 0..4 {
        sender.send(request()).await.unwrap();
    }
    assert_eq!(first.load(Ordering::SeqCst), 4);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_provider_list_is_rejected() {
    let result = RoundRobinSender::builder().build(Vec::new());
    assert!(matches!(result, Err(FailoverError::NoProviders)));
}
