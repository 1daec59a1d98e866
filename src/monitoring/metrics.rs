//! Classification metrics
//!
//! Rolling latency window for successful classifications plus lock-free
//! outcome counters. Only the latency window is behind a `RwLock`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Instant;

use serde::Serialize;

/// Why a classification request did not produce a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidImage,
    Inference,
    Timeout,
}

/// Metrics collector shared by every in-flight classification.
pub struct PerformanceMetrics {
    window_size: usize,
    window: RwLock<VecDeque<f64>>,

    successes: AtomicU64,
    invalid_images: AtomicU64,
    inference_errors: AtomicU64,
    timeouts: AtomicU64,

    start_time: Instant,
}

impl PerformanceMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            window: RwLock::new(VecDeque::with_capacity(window_size)),
            successes: AtomicU64::new(0),
            invalid_images: AtomicU64::new(0),
            inference_errors: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed classification
    pub fn record_success(&self, latency_ms: f64) {
        if let Ok(mut window) = self.window.write() {
            window.push_back(latency_ms);
            if window.len() > self.window_size {
                window.pop_front();
            }
        }
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed classification
    pub fn record_failure(&self, kind: FailureKind) {
        let counter = match kind {
            FailureKind::InvalidImage => &self.invalid_images,
            FailureKind::Inference => &self.inference_errors,
            FailureKind::Timeout => &self.timeouts,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency(&self) -> f64 {
        self.window
            .read()
            .map(|w| {
                if w.is_empty() {
                    0.0
                } else {
                    w.iter().sum::<f64>() / w.len() as f64
                }
            })
            .unwrap_or(0.0)
    }

    /// Percentile over the rolling window, via quickselect.
    pub fn percentile_latency(&self, percentile: f64) -> f64 {
        self.window
            .read()
            .map(|w| {
                if w.is_empty() {
                    return 0.0;
                }
                let mut data: Vec<f64> = w.iter().copied().collect();
                let idx = ((percentile / 100.0) * (data.len() - 1) as f64) as usize;
                let idx = idx.min(data.len() - 1);
                data.select_nth_unstable_by(idx, |a, b| {
                    a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
                });
                data[idx]
            })
            .unwrap_or(0.0)
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.invalid_images.load(Ordering::Relaxed)
            + self.inference_errors.load(Ordering::Relaxed)
            + self.timeouts.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> MetricsSummary {
        let successes = self.successes();
        let failures = self.failures();
        let total = successes + failures;
        MetricsSummary {
            total_requests: total,
            successes,
            invalid_images: self.invalid_images.load(Ordering::Relaxed),
            inference_errors: self.inference_errors.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            error_rate: if total > 0 {
                failures as f64 / total as f64
            } else {
                0.0
            },
            avg_latency_ms: self.avg_latency(),
            p50_latency_ms: self.percentile_latency(50.0),
            p95_latency_ms: self.percentile_latency(95.0),
            p99_latency_ms: self.percentile_latency(99.0),
            uptime_secs: self.start_time.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Point-in-time view of [`PerformanceMetrics`]
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub successes: u64,
    pub invalid_images: u64,
    pub inference_errors: u64,
    pub timeouts: u64,
    pub error_rate: f64,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub uptime_secs: f64,
}
