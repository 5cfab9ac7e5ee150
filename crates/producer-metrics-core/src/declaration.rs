//! # Metric Declarations
//!
//! The fixed set of metrics fed by producer notifications. Declarations are
//! registered once at startup through [`MetricsSink::declare`] and never change
//! afterwards.
//!
//! Histogram bucket boundaries are not computed here: a declaration names either a
//! preset, which the sink resolves from its configuration, or an explicit list.

use crate::{
    labels::{CLIENT, TOPIC},
    sink::MetricsSink,
    SinkError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric primitive kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonically increasing value
    Counter,
    /// Last-write-wins instantaneous value
    Gauge,
    /// Bucketed distribution of observations
    Histogram,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
        };
        write!(f, "{}", s)
    }
}

/// Named bucket presets resolved by the sink's configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketPreset {
    /// Byte-size magnitudes
    Memory,
    /// Latency magnitudes, in seconds
    Network,
}

impl BucketPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Network => "network",
        }
    }

    /// Boundaries used when the sink configuration does not override the preset
    pub fn default_boundaries(&self) -> Vec<f64> {
        match self {
            // 128 B .. 64 MiB
            Self::Memory => (7..=26).map(|exp| f64::from(1u32 << exp)).collect(),
            Self::Network => vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        }
    }
}

impl fmt::Display for BucketPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Histogram bucket specification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BucketSpec {
    Preset(BucketPreset),
    Explicit(&'static [f64]),
}

/// Declaration of a single metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDeclaration {
    pub name: &'static str,
    pub kind: MetricKind,
    pub doc: &'static str,
    /// Exact label keys every sample of this metric carries
    pub labels: &'static [&'static str],
    /// Required for histograms, absent otherwise
    pub buckets: Option<BucketSpec>,
}

impl MetricDeclaration {
    /// Check structural constraints a sink relies on
    ///
    /// # Errors
    /// - `SinkError::InvalidDeclaration` - empty name, buckets on a non-histogram,
    ///   histogram without buckets, or explicit boundaries that are not strictly increasing
    pub fn validate(&self) -> Result<(), SinkError> {
        let invalid = |message: &str| SinkError::InvalidDeclaration {
            name: self.name.to_string(),
            message: message.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("name must not be empty"));
        }

        match (self.kind, self.buckets) {
            (MetricKind::Histogram, None) => Err(invalid("histogram requires a bucket spec")),
            (MetricKind::Histogram, Some(BucketSpec::Explicit(bounds))) => {
                if bounds.is_empty() {
                    return Err(invalid("explicit buckets must not be empty"));
                }
                if !bounds.iter().all(|b| b.is_finite())
                    || bounds.windows(2).any(|pair| pair[0] >= pair[1])
                {
                    return Err(invalid("explicit buckets must be finite and strictly increasing"));
                }
                Ok(())
            }
            (MetricKind::Histogram, Some(BucketSpec::Preset(_))) => Ok(()),
            (_, Some(_)) => Err(invalid("only histograms take a bucket spec")),
            (_, None) => Ok(()),
        }
    }
}

/// Metric names fed by producer notifications
pub mod names {
    pub const MESSAGES: &str = "kafka_producer_messages";
    pub const MESSAGE_SIZE: &str = "kafka_producer_message_size";
    pub const BUFFER_SIZE: &str = "kafka_producer_buffer_size";
    pub const MAX_BUFFER_SIZE: &str = "kafka_producer_max_buffer_size";
    pub const BUFFER_FILL_RATIO: &str = "kafka_producer_buffer_fill_ratio";
    pub const BUFFER_OVERFLOWS: &str = "kafka_producer_buffer_overflows";
    pub const DELIVERY_ERRORS: &str = "kafka_producer_delivery_errors";
    pub const DELIVERY_LATENCY: &str = "kafka_producer_delivery_latency";
    pub const DELIVERED_MESSAGES: &str = "kafka_producer_delivered_messages";
    pub const DELIVERY_ATTEMPTS: &str = "kafka_producer_delivery_attempts";
    pub const ACK_MESSAGES: &str = "kafka_producer_ack_messages";
    pub const ACK_LATENCY: &str = "kafka_producer_ack_latency";
    pub const ACK_ERRORS: &str = "kafka_producer_ack_errors";
}

const CLIENT_ONLY: &[&str] = &[CLIENT];
const CLIENT_TOPIC: &[&str] = &[CLIENT, TOPIC];

/// Delivery attempt boundaries
pub const DELIVERY_ATTEMPT_BUCKETS: &[f64] = &[0.0, 6.0, 12.0, 18.0, 24.0, 30.0];

const fn counter(name: &'static str, labels: &'static [&'static str], doc: &'static str) -> MetricDeclaration {
    MetricDeclaration {
        name,
        kind: MetricKind::Counter,
        doc,
        labels,
        buckets: None,
    }
}

const fn gauge(name: &'static str, labels: &'static [&'static str], doc: &'static str) -> MetricDeclaration {
    MetricDeclaration {
        name,
        kind: MetricKind::Gauge,
        doc,
        labels,
        buckets: None,
    }
}

const fn histogram(
    name: &'static str,
    labels: &'static [&'static str],
    buckets: BucketSpec,
    doc: &'static str,
) -> MetricDeclaration {
    MetricDeclaration {
        name,
        kind: MetricKind::Histogram,
        doc,
        labels,
        buckets: Some(buckets),
    }
}

/// Every metric fed by producer notifications
pub static PRODUCER_METRICS: [MetricDeclaration; 13] = [
    counter(
        names::MESSAGES,
        CLIENT_TOPIC,
        "Number of messages written to Kafka producer",
    ),
    histogram(
        names::MESSAGE_SIZE,
        CLIENT_TOPIC,
        BucketSpec::Preset(BucketPreset::Memory),
        "Histogram of message sizes written to Kafka producer",
    ),
    gauge(
        names::BUFFER_SIZE,
        CLIENT_ONLY,
        "The current size of the Kafka producer buffer, in messages",
    ),
    gauge(
        names::MAX_BUFFER_SIZE,
        CLIENT_ONLY,
        "The max size of the Kafka producer buffer",
    ),
    gauge(
        names::BUFFER_FILL_RATIO,
        CLIENT_ONLY,
        "The current ratio of Kafka producer buffer in use",
    ),
    counter(
        names::BUFFER_OVERFLOWS,
        CLIENT_TOPIC,
        "A count of kafka producer buffer overflow errors",
    ),
    counter(
        names::DELIVERY_ERRORS,
        CLIENT_ONLY,
        "A count of kafka producer delivery errors",
    ),
    histogram(
        names::DELIVERY_LATENCY,
        CLIENT_ONLY,
        BucketSpec::Preset(BucketPreset::Network),
        "Kafka producer delivery latency histogram",
    ),
    counter(
        names::DELIVERED_MESSAGES,
        CLIENT_ONLY,
        "A count of the total messages delivered to Kafka",
    ),
    histogram(
        names::DELIVERY_ATTEMPTS,
        CLIENT_ONLY,
        BucketSpec::Explicit(DELIVERY_ATTEMPT_BUCKETS),
        "A count of the total message deliveries attempted",
    ),
    counter(
        names::ACK_MESSAGES,
        CLIENT_TOPIC,
        "Count of the number of messages Acked by Kafka",
    ),
    histogram(
        names::ACK_LATENCY,
        CLIENT_TOPIC,
        BucketSpec::Preset(BucketPreset::Network),
        "Delay between message being produced and Acked",
    ),
    counter(
        names::ACK_ERRORS,
        CLIENT_TOPIC,
        "Count of the number of Kafka Ack errors",
    ),
];

/// Look up a producer metric declaration by name
pub fn find_declaration(name: &str) -> Option<&'static MetricDeclaration> {
    PRODUCER_METRICS.iter().find(|decl| decl.name == name)
}

/// Declare every producer metric on the sink.
///
/// Stops at the first declaration the sink rejects.
pub fn declare_all<S: MetricsSink + ?Sized>(sink: &S) -> Result<(), SinkError> {
    for declaration in &PRODUCER_METRICS {
        sink.declare(declaration)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "declaration_tests.rs"]
mod tests;
