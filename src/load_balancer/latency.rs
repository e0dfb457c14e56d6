//! Latency collection for load-balancer feedback.
//!
//! # Responsibilities
//! - Record the latency of every completed call per endpoint
//! - Keep a bounded, ordered window of recent samples per endpoint
//! - Expose samples and averages to a load-balancing strategy
//!
//! # Design Decisions
//! - One collector is created at startup and injected into every client; it
//!   is not a global
//! - Samples are appended oldest → newest; the oldest sample is evicted once
//!   the window is full

use std::collections::VecDeque;
use std::time::Duration;

use dashmap::DashMap;

/// Samples kept per endpoint unless configured otherwise.
pub const DEFAULT_WINDOW: usize = 128;

/// Endpoint → recent latencies.
#[derive(Debug)]
pub struct LatencyCollector {
    window: usize,
    samples: DashMap<String, VecDeque<Duration>>,
}

impl LatencyCollector {
    /// Create a collector with the default window.
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Create a collector keeping at most `window` samples per endpoint.
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
            samples: DashMap::new(),
        }
    }

    /// Record one observed latency for `endpoint`.
    pub fn record(&self, endpoint: &str, latency: Duration) {
        let mut entry = self.samples.entry(endpoint.to_string()).or_default();
        if entry.len() == self.window {
            entry.pop_front();
        }
        entry.push_back(latency);
    }

    /// Recorded latencies for `endpoint`, oldest first.
    pub fn samples(&self, endpoint: &str) -> Vec<Duration> {
        self.samples
            .get(endpoint)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Mean latency for `endpoint`, if any samples exist.
    pub fn average(&self, endpoint: &str) -> Option<Duration> {
        let samples = self.samples.get(endpoint)?;
        if samples.is_empty() {
            return None;
        }
        let total: Duration = samples.iter().sum();
        Some(total / samples.len() as u32)
    }

    /// Endpoints with at least one sample, sorted.
    pub fn endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<String> = self.samples.iter().map(|e| e.key().clone()).collect();
        endpoints.sort();
        endpoints
    }

    /// Forget every sample for `endpoint`.
    pub fn reset(&self, endpoint: &str) {
        self.samples.remove(endpoint);
    }
}

impl Default for LatencyCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_average() {
        let collector = LatencyCollector::new();
        collector.record("10.0.0.1:80", Duration::from_millis(10));
        collector.record("10.0.0.1:80", Duration::from_millis(30));

        assert_eq!(
            collector.samples("10.0.0.1:80"),
            vec![Duration::from_millis(10), Duration::from_millis(30)]
        );
        assert_eq!(collector.average("10.0.0.1:80"), Some(Duration::from_millis(20)));
        assert_eq!(collector.average("unknown"), None);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let collector = LatencyCollector::with_window(2);
        for ms in [1, 2, 3] {
            collector.record("a", Duration::from_millis(ms));
        }
        assert_eq!(
            collector.samples("a"),
            vec![Duration::from_millis(2), Duration::from_millis(3)]
        );
    }

    #[test]
    fn test_endpoints_and_reset() {
        let collector = LatencyCollector::new();
        collector.record("b", Duration::from_millis(1));
        collector.record("a", Duration::from_millis(1));
        assert_eq!(collector.endpoints(), vec!["a".to_string(), "b".to_string()]);

        collector.reset("a");
        assert_eq!(collector.endpoints(), vec!["b".to_string()]);
    }
}
