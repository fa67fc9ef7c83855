// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Metrics for initializer activity.
//!
//! Lightweight in-process counters, no exporter. Enough to answer "which
//! instrumentations activated, which failed and why, and how long did it
//! take" from a diagnostics dump.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Global metrics instance.
pub static GLOBAL_METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// Central metrics collection.
#[derive(Debug)]
pub struct Metrics {
    /// Per-initializer counters, keyed by initializer name.
    initializers: RwLock<HashMap<String, InitializerMetrics>>,

    /// Disposal outcomes across all tracked instances.
    disposals: DisposalMetrics,

    /// Start time for calculating uptime.
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            initializers: RwLock::new(HashMap::new()),
            disposals: DisposalMetrics::new(),
            start_time: Instant::now(),
        }
    }

    /// Record the end of an activation. `failure` is the error kind, if any.
    ///
    /// Runs once per initializer, on the call that won its gate. Calls that
    /// lose the gate count on the initializer itself and never get here.
    pub fn record_activation(&self, initializer: &str, duration: Duration, failure: Option<&str>) {
        let mut initializers = self.initializers.write();
        let metrics = initializers
            .entry(initializer.to_string())
            .or_default();
        metrics.record_activation(duration, failure);
    }

    /// Record one disposal attempt.
    pub fn record_disposal(&self, success: bool) {
        self.disposals.record(success);
    }

    /// Get metrics for a specific initializer.
    pub fn initializer_metrics(&self, name: &str) -> Option<InitializerMetrics> {
        self.initializers.read().get(name).cloned()
    }

    /// Disposal counts as `(succeeded, failed)`.
    pub fn disposal_counts(&self) -> (u64, u64) {
        (self.disposals.succeeded(), self.disposals.failed())
    }

    /// Get uptime since metrics were initialized.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Take a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let (disposed, disposal_failures) = self.disposal_counts();
        MetricsSnapshot {
            initializers: self.initializers.read().clone(),
            disposed,
            disposal_failures,
            uptime: self.uptime(),
        }
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        self.initializers.write().clear();
        self.disposals.reset();
    }

    #[cfg(test)]
    pub(crate) fn lock_registry(
        &self,
    ) -> parking_lot::RwLockWriteGuard<'_, HashMap<String, InitializerMetrics>> {
        self.initializers.write()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for one initializer's activation.
///
/// Per-call counts (`fire_count`, `rejected_count`) are kept on the
/// [`Initializer`](crate::loader::Initializer) itself.
#[derive(Debug, Clone, Default)]
pub struct InitializerMetrics {
    /// Activations that produced an instrumentation.
    pub activations: u64,

    /// Activations that failed.
    pub failures: u64,

    /// Failures by error kind (`resolution`, `plugin`, `panic`, `other`).
    pub failures_by_kind: HashMap<String, u64>,

    /// Time spent in the winning call.
    pub activation_time: Duration,

    /// Latency distribution of activations.
    pub histogram: Histogram,
}

impl InitializerMetrics {
    fn record_activation(&mut self, duration: Duration, failure: Option<&str>) {
        match failure {
            None => self.activations += 1,
            Some(kind) => {
                self.failures += 1;
                *self.failures_by_kind.entry(kind.to_string()).or_insert(0) += 1;
            }
        }
        self.activation_time += duration;
        self.histogram.record(duration);
    }

    /// Whether the gate was claimed by some call.
    pub fn has_run(&self) -> bool {
        self.activations + self.failures > 0
    }
}

/// Histogram with fixed buckets for latency tracking.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Upper bounds in microseconds; the last bucket is open-ended.
    buckets: Vec<u64>,
    counts: Vec<u64>,
}

impl Histogram {
    /// Create a histogram with custom bucket bounds (in microseconds).
    pub fn with_buckets(buckets: Vec<u64>) -> Self {
        let counts = vec![0; buckets.len() + 1];
        Self { buckets, counts }
    }

    /// Record a duration value.
    pub fn record(&mut self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        let idx = self
            .buckets
            .iter()
            .position(|&b| micros <= b)
            .unwrap_or(self.buckets.len());
        self.counts[idx] += 1;
    }

    /// Get counts for each bucket.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Total number of samples.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Upper bound of the bucket holding the `p`th percentile sample.
    pub fn percentile(&self, p: f64) -> Duration {
        let total = self.total();
        if total == 0 {
            return Duration::ZERO;
        }

        let target = ((total as f64 * p / 100.0).ceil() as u64).max(1);
        let mut cumulative = 0u64;
        for (i, &count) in self.counts.iter().enumerate() {
            cumulative += count;
            if cumulative >= target {
                let micros = match self.buckets.get(i) {
                    Some(&bound) => bound,
                    None => self.buckets.last().copied().unwrap_or(0) * 10,
                };
                return Duration::from_micros(micros);
            }
        }

        Duration::ZERO
    }

    /// Get p99 latency.
    pub fn p99(&self) -> Duration {
        self.percentile(99.0)
    }
}

impl Default for Histogram {
    fn default() -> Self {
        // 10us, 100us, 1ms, 10ms, 100ms, 1s
        Self::with_buckets(vec![10, 100, 1_000, 10_000, 100_000, 1_000_000])
    }
}

#[derive(Debug)]
struct DisposalMetrics {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl DisposalMetrics {
    fn new() -> Self {
        Self {
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    fn record(&self, success: bool) {
        let counter = if success { &self.succeeded } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.succeeded.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}

/// A snapshot of all metrics at a point in time.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub initializers: HashMap<String, InitializerMetrics>,
    pub disposed: u64,
    pub disposal_failures: u64,
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// Format as a human-readable report.
    pub fn format_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Instrumentation Loader ===\n\n");
        report.push_str(&format!("Uptime: {:.2?}\n", self.uptime));
        report.push_str(&format!(
            "Disposals: {} ok, {} failed\n\n",
            self.disposed, self.disposal_failures
        ));

        if !self.initializers.is_empty() {
            let mut names: Vec<&String> = self.initializers.keys().collect();
            names.sort();

            report.push_str("Initializers:\n");
            for name in names {
                let m = &self.initializers[name];
                let status = if m.activations > 0 {
                    "active"
                } else if m.failures > 0 {
                    "failed"
                } else {
                    "pending"
                };
                report.push_str(&format!(
                    "  {}: {} ({:.2?})\n",
                    name, status, m.activation_time
                ));
            }
        }

        report
    }
}

/// Record an activation to global metrics.
pub fn record_activation(initializer: &str, duration: Duration, failure: Option<&str>) {
    GLOBAL_METRICS.record_activation(initializer, duration, failure);
}

/// Record a disposal attempt to global metrics.
pub fn record_disposal(success: bool) {
    GLOBAL_METRICS.record_disposal(success);
}
