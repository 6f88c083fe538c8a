use crate::error::LimiterError;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A keyed admission check.
///
/// `limit` answers "should this call be rejected?" and, when it answers
/// `false`, has already counted the call. Checking and recording must be a
/// single atomic step: two concurrent callers must never both observe "not
/// limited" when only one slot is left.
pub trait Limiter: Send + Sync {
    /// Returns `Ok(true)` when the call identified by `key` is over the limit.
    fn limit<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, LimiterError>>;
}

impl<L> Limiter for Arc<L>
where
    L: Limiter + ?Sized,
{
    fn limit<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, LimiterError>> {
        (**self).limit(key)
    }
}

/// In-process sliding-window limiter.
///
/// Keeps, per key, the admission times that fall inside the last
/// `interval`. A call is admitted while fewer than `rate` admissions remain
/// in the window. Eviction, the comparison and the insert all happen under
/// one lock, so the window never holds more than `rate` entries.
#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    interval: Duration,
    rate: usize,
    windows: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl SlidingWindowLimiter {
    /// Allows at most `rate` calls per key within any `interval`.
    pub fn new(interval: Duration, rate: usize) -> Self {
        Self {
            interval,
            rate,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of admissions currently counted for `key`.
    pub fn in_window(&self, key: &str) -> usize {
        let now = Instant::now();
        let windows = self.windows.lock();
        windows
            .get(key)
            .map(|w| w.iter().filter(|t| now.duration_since(**t) < self.interval).count())
            .unwrap_or(0)
    }

    fn try_admit(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock();
        let window = windows.entry(key.to_string()).or_default();

        while let Some(oldest) = window.front() {
            if now.duration_since(*oldest) >= self.interval {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= self.rate {
            return false;
        }
        window.push_back(now);
        true
    }
}

impl Limiter for SlidingWindowLimiter {
    fn limit<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, LimiterError>> {
        let limited = !self.try_admit(key);
        Box::pin(async move { Ok(limited) })
    }
}
