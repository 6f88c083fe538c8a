use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of recent send latencies.
///
/// Holds at most `capacity` samples, oldest first. Each new sample evicts the
/// oldest once the window is full, and the decision is made on the mean of
/// what remains, so a single slow call among fast ones does not trip it while
/// sustained slowness does.
#[derive(Debug)]
pub struct LatencyWindow {
    capacity: usize,
    samples: Mutex<VecDeque<Duration>>,
}

impl LatencyWindow {
    /// Creates an empty window. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Creates a window pre-filled with `samples`, keeping only the newest
    /// `capacity` of them.
    pub fn with_samples(capacity: usize, samples: impl IntoIterator<Item = Duration>) -> Self {
        let window = Self::new(capacity);
        {
            let mut guard = window.samples.lock();
            for sample in samples {
                if guard.len() == window.capacity {
                    guard.pop_front();
                }
                guard.push_back(sample);
            }
        }
        window
    }

    /// Records `latency` and reports whether the window mean has reached
    /// `threshold`.
    pub fn record(&self, latency: Duration, threshold: Duration) -> bool {
        self.record_mean(latency) >= threshold
    }

    /// Records `latency` and returns the mean of the window afterwards.
    pub fn record_mean(&self, latency: Duration) -> Duration {
        let mut samples = self.samples.lock();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(latency);

        let total: Duration = samples.iter().sum();
        // len is at least 1 here and never exceeds capacity
        total / samples.len() as u32
    }

    /// Current samples, oldest first.
    pub fn samples(&self) -> Vec<Duration> {
        self.samples.lock().iter().copied().collect()
    }

    /// Maximum number of samples kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
