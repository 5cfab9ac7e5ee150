//! # Producer Metrics Prometheus
//!
//! Prometheus implementation of the [`MetricsSink`](producer_metrics_core::MetricsSink)
//! interface, plus the bucket configuration it resolves histogram presets from.
//!
//! ```rust
//! use producer_metrics_core::{declare_all, EventBus, ProducerTranslator};
//! use producer_metrics_prometheus::{BucketConfig, PrometheusMetricsSink};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(PrometheusMetricsSink::new(
//!     prometheus::Registry::new(),
//!     BucketConfig::default(),
//! ));
//! declare_all(sink.as_ref()).unwrap();
//!
//! let bus = EventBus::new();
//! ProducerTranslator::new(Arc::clone(&sink)).attach(&bus);
//! ```

pub mod config;
pub mod metrics;

pub use config::{BucketConfig, ConfigError, PresetBuckets};
pub use metrics::PrometheusMetricsSink;
