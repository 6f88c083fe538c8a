//! Property tests for the latency window.
//!
//! Invariants tested:
//! - Never holds more than its capacity
//! - Keeps exactly the newest samples, oldest first
//! - The degradation decision is the window mean against the threshold

use notify_resilience_async::LatencyWindow;
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    /// Property: the window keeps the newest `capacity` samples in order
    #[test]
    fn keeps_newest_samples(
        capacity in 1usize..=10,
        latencies in prop::collection::vec(0u64..=5_000, 0..=50),
    ) {
        let window = LatencyWindow::new(capacity);
        for millis in &latencies {
            window.record_mean(Duration::from_millis(*millis));
        }

        let expected: Vec<Duration> = latencies
            .iter()
            .skip(latencies.len().saturating_sub(capacity))
            .map(|millis| Duration::from_millis(*millis))
            .collect();

        prop_assert!(window.samples().len() <= capacity);
        prop_assert_eq!(window.samples(), expected);
    }

    /// Property: degraded exactly when the mean of the kept samples reaches
    /// the threshold
    #[test]
    fn decision_matches_window_mean(
        capacity in 1usize..=5,
        threshold_ms in 1u64..=1_000,
        latencies in prop::collection::vec(0u64..=2_000, 1..=30),
    ) {
        let window = LatencyWindow::new(capacity);
        let threshold = Duration::from_millis(threshold_ms);

        for (i, millis) in latencies.iter().enumerate() {
            let degraded = window.record(Duration::from_millis(*millis), threshold);

            let start = (i + 1).saturating_sub(capacity);
            let kept = &latencies[start..=i];
            let mean = Duration::from_millis(kept.iter().sum::<u64>()) / kept.len() as u32;

            prop_assert_eq!(degraded, mean >= threshold, "after sample {}", i);
        }
    }

    /// Property: a lone outlier among fast calls never trips a full window
    #[test]
    fn single_outlier_is_absorbed(
        fast_ms in 0u64..=100,
        outlier_ms in 0u64..1_300,
    ) {
        let threshold = Duration::from_millis(500);
        let window = LatencyWindow::new(3);

        window.record(Duration::from_millis(fast_ms), threshold);
        window.record(Duration::from_millis(fast_ms), threshold);
        let degraded = window.record(Duration::from_millis(outlier_ms), threshold);

        // Tripping needs 2 * fast + outlier >= 1500ms
        prop_assert!(!degraded);
    }
}
