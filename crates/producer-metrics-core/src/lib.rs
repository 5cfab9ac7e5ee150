//! # Producer Metrics Core
//!
//! Translates Kafka producer lifecycle notifications into metric updates.
//!
//! The producer client publishes notifications (message produced, buffer overflow,
//! delivery completed, message acked, topic error) on the `producer.kafka` scope.
//! [`ProducerTranslator`] binds one handler per notification, extracts the payload
//! fields it needs, derives label sets and values, and forwards them to an injected
//! [`MetricsSink`].
//!
//! ## Architecture
//!
//! - The translator depends only on the [`MetricsSink`] and [`NotificationBus`] traits
//! - Infrastructure implementations (e.g. Prometheus) live in sibling crates
//! - Handlers are stateless; every invocation reads its own event and writes to the sink
//!
//! ## Usage
//!
//! ```rust
//! use producer_metrics_core::{
//!     declare_all, Event, EventBus, InMemoryMetricsSink, LabelSet, ProducerTranslator,
//! };
//! use std::sync::Arc;
//!
//! let sink = Arc::new(InMemoryMetricsSink::new());
//! declare_all(sink.as_ref()).unwrap();
//!
//! let bus = EventBus::new();
//! ProducerTranslator::new(Arc::clone(&sink)).attach(&bus);
//!
//! let event = Event::new("buffer_overflow.producer.kafka")
//!     .with_field("client_id", "c1")
//!     .with_field("topic", "t1");
//! bus.publish(&event).unwrap();
//!
//! let labels = LabelSet::client_topic("c1", "t1");
//! assert_eq!(sink.counter_value("kafka_producer_buffer_overflows", &labels), Some(1));
//! ```

use serde::{Deserialize, Serialize};

/// Standard result type for event translation
pub type TranslationResult<T> = Result<T, TranslationError>;

// ============================================================================
// Error Types
// ============================================================================

/// Error raised by a handler when the event payload cannot be translated.
///
/// Handlers extract every field before touching the sink, so an error always
/// means no metric was updated for that event.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum TranslationError {
    #[error("Event '{event}' is missing required field '{field}'")]
    MissingField { event: String, field: String },

    #[error("Event '{event}' field '{field}' is invalid: expected {expected}")]
    InvalidField {
        event: String,
        field: String,
        expected: String,
    },
}

impl TranslationError {
    /// Name of the payload field that caused the failure
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field, .. } => field,
            Self::InvalidField { field, .. } => field,
        }
    }
}

/// Error returned by a metrics sink when a declaration cannot be registered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("Metric '{name}' already declared as {existing}, cannot redeclare as {requested}")]
    KindMismatch {
        name: String,
        existing: MetricKind,
        requested: MetricKind,
    },

    #[error("Metric '{name}' has an invalid declaration: {message}")]
    InvalidDeclaration { name: String, message: String },

    #[error("Metric '{name}' could not be registered: {message}")]
    Registration { name: String, message: String },
}

// ============================================================================
// Module declarations
// ============================================================================

/// Producer notification payloads
pub mod event;

/// Label sets attached to metric samples
pub mod labels;

/// Static metric declarations and bucket specifications
pub mod declaration;

/// Metrics sink capability consumed by the translator
pub mod sink;

/// In-process notification bus
pub mod bus;

/// Event-to-metric translation
pub mod translator;

/// In-memory sink implementations
pub mod adapters;

// Re-export key types for convenience
pub use adapters::{InMemoryMetricsSink, SinkCall};
pub use bus::{notification_name, Dispatch, EventBus, Handler, NotificationBus};
pub use declaration::{
    declare_all, find_declaration, BucketPreset, BucketSpec, MetricDeclaration, MetricKind,
    PRODUCER_METRICS,
};
pub use event::{Event, Payload};
pub use labels::LabelSet;
pub use sink::{MetricsSink, NoOpMetricsSink};
pub use translator::{ProducerEventKind, ProducerTranslator, PRODUCER_SCOPE};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
