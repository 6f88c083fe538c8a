//! Stress tests for the delivery decorators
//!
//! ## What We Test
//!
//! - **High volume**: Hundreds of thousands of sends through each decorator
//! - **High concurrency**: Many tasks sharing one breaker, limiter or store
//! - **State consistency**: Counters and job states stay correct under contention

pub mod async_delivery;
pub mod failover;

use notify_resilience_core::SendRequest;

pub fn request(i: usize) -> SendRequest {
    SendRequest::new(
        format!("tpl-{}", i % 16),
        vec![i.to_string()],
        vec!["+15550100".into()],
    )
}
