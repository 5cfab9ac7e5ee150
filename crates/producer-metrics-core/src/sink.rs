//! Metrics sink capability.
//!
//! The translator never talks to a metrics engine directly. It forwards every
//! update through this trait, and infrastructure crates implement it (e.g. with
//! Prometheus) so the translator stays independent of any registry.
//!
//! # Examples
//!
//! ```rust
//! use producer_metrics_core::{LabelSet, MetricsSink, NoOpMetricsSink};
//! use std::sync::Arc;
//!
//! let sink: Arc<dyn MetricsSink> = Arc::new(NoOpMetricsSink);
//! sink.increment("kafka_producer_ack_errors", &LabelSet::client_topic("c1", "t1"), 1);
//! ```

use crate::{declaration::MetricDeclaration, labels::LabelSet, SinkError};

/// Destination for metric updates.
///
/// # Thread Safety
///
/// All methods take `&self` so one sink can be shared behind an `Arc` by handlers
/// running concurrently. Implementations must be thread-safe.
///
/// # Best-Effort Pattern
///
/// Recording methods return nothing. A sink that cannot apply an update (unknown
/// metric, label mismatch, backend failure) logs and drops it; failures never
/// propagate back into event handling.
pub trait MetricsSink: Send + Sync {
    /// Register a metric. Declaring the same metric twice is a no-op.
    ///
    /// # Errors
    /// - `SinkError::KindMismatch` - the name is already declared with another kind
    /// - `SinkError::InvalidDeclaration` - the declaration is malformed
    /// - `SinkError::Registration` - the backend rejected the metric
    fn declare(&self, declaration: &MetricDeclaration) -> Result<(), SinkError>;

    /// Add `delta` to a counter
    fn increment(&self, name: &str, labels: &LabelSet, delta: u64);

    /// Record a histogram observation
    fn observe(&self, name: &str, labels: &LabelSet, value: f64);

    /// Set a gauge
    fn set(&self, name: &str, labels: &LabelSet, value: f64);
}

impl<S: MetricsSink + ?Sized> MetricsSink for std::sync::Arc<S> {
    fn declare(&self, declaration: &MetricDeclaration) -> Result<(), SinkError> {
        (**self).declare(declaration)
    }

    fn increment(&self, name: &str, labels: &LabelSet, delta: u64) {
        (**self).increment(name, labels, delta)
    }

    fn observe(&self, name: &str, labels: &LabelSet, value: f64) {
        (**self).observe(name, labels, value)
    }

    fn set(&self, name: &str, labels: &LabelSet, value: f64) {
        (**self).set(name, labels, value)
    }
}

/// Sink that discards every update.
///
/// Useful when metrics are disabled or in tests that don't inspect metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetricsSink;

impl MetricsSink for NoOpMetricsSink {
    fn declare(&self, declaration: &MetricDeclaration) -> Result<(), SinkError> {
        declaration.validate()
    }

    fn increment(&self, _name: &str, _labels: &LabelSet, _delta: u64) {
        // No-op
    }

    fn observe(&self, _name: &str, _labels: &LabelSet, _value: f64) {
        // No-op
    }

    fn set(&self, _name: &str, _labels: &LabelSet, _value: f64) {
        // No-op
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
