//! # Sink Adapters
//!
//! In-process implementations of the metrics sink interface.

pub mod memory_sink;

pub use memory_sink::{InMemoryMetricsSink, SinkCall};
