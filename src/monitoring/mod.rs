//! Monitoring Module
//!
//! Latency and outcome tracking for the classification path.

mod metrics;

pub use metrics::{FailureKind, MetricsSummary, PerformanceMetrics};
