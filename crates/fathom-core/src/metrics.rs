//! In-process measurement histograms.
//!
//! Records parse/lint durations and extraction counts without any storage
//! or network. Snapshots are serializable for the CLI's `--json` output.

use std::collections::HashMap;
use std::sync::Mutex;

/// Histogram names recorded by the pipeline.
pub const PARSE_DURATION_MS: &str = "parse_duration_ms";
pub const LINT_DURATION_MS: &str = "lint_duration_ms";
pub const SYMBOLS_PER_PARSE: &str = "symbols_per_parse";
pub const ISSUES_PER_LINT: &str = "issues_per_lint";
pub const PROTOCOLS_DETECTED: &str = "protocols_detected";

/// A single named histogram: count, sum, min, max, and coarse buckets.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Histogram {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    /// Bucket upper bounds: 1, 10, 100, 1_000, 10_000, +inf.
    pub buckets: [u64; 6],
}

const BUCKET_BOUNDS: [f64; 5] = [1.0, 10.0, 100.0, 1_000.0, 10_000.0];

impl Histogram {
    fn record(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
        let idx = BUCKET_BOUNDS
            .iter()
            .position(|bound| value <= *bound)
            .unwrap_or(BUCKET_BOUNDS.len());
        self.buckets[idx] += 1;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Shared recorder. Safe for concurrent use from rayon workers.
#[derive(Debug, Default)]
pub struct Metrics {
    histograms: Mutex<HashMap<&'static str, Histogram>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation under a histogram name.
    pub fn record(&self, name: &'static str, value: f64) {
        let mut histograms = self.histograms.lock().unwrap();
        histograms.entry(name).or_default().record(value);
    }

    /// Copy out the current state of every histogram.
    pub fn snapshot(&self) -> HashMap<&'static str, Histogram> {
        self.histograms.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let metrics = Metrics::new();
        metrics.record(PARSE_DURATION_MS, 5.0);
        metrics.record(PARSE_DURATION_MS, 15.0);
        let snap = metrics.snapshot();
        let h = &snap[PARSE_DURATION_MS];
        assert_eq!(h.count, 2);
        assert_eq!(h.sum, 20.0);
        assert_eq!(h.min, 5.0);
        assert_eq!(h.max, 15.0);
        assert_eq!(h.mean(), 10.0);
    }

    #[test]
    fn test_bucket_assignment() {
        let metrics = Metrics::new();
        metrics.record(SYMBOLS_PER_PARSE, 0.5);
        metrics.record(SYMBOLS_PER_PARSE, 50.0);
        metrics.record(SYMBOLS_PER_PARSE, 50_000.0);
        let snap = metrics.snapshot();
        let h = &snap[SYMBOLS_PER_PARSE];
        assert_eq!(h.buckets[0], 1);
        assert_eq!(h.buckets[2], 1);
        assert_eq!(h.buckets[5], 1);
    }

    #[test]
    fn test_empty_histogram_mean() {
        assert_eq!(Histogram::default().mean(), 0.0);
    }
}
