//! Common test utilities for producer metrics integration tests
//!
//! This module provides:
//! - A wired bus, translator and Prometheus sink on a private registry
//! - Builders for each producer notification

use producer_metrics_core::{declare_all, Event, EventBus, ProducerEventKind, ProducerTranslator};
use producer_metrics_prometheus::{BucketConfig, PrometheusMetricsSink};
use std::{sync::Arc, time::Duration};

/// Bus with the producer translator attached to a Prometheus sink
pub struct Harness {
    pub bus: EventBus,
    pub sink: Arc<PrometheusMetricsSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_buckets(BucketConfig::default())
    }

    pub fn with_buckets(buckets: BucketConfig) -> Self {
        init_tracing();

        let sink = Arc::new(PrometheusMetricsSink::new(prometheus::Registry::new(), buckets));
        declare_all(sink.as_ref()).unwrap();

        let bus = EventBus::new();
        ProducerTranslator::new(Arc::clone(&sink)).attach(&bus);

        Self { bus, sink }
    }

    /// Current Prometheus text exposition
    pub fn scrape(&self) -> String {
        self.sink.encode_text().unwrap()
    }
}

/// Install a test-writer subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn produce_message(
    client: &str,
    topic: &str,
    message_size: u64,
    buffer_size: u64,
    max_buffer_size: u64,
) -> Event {
    Event::new(ProducerEventKind::MessageProduced.notification_name())
        .with_field("client_id", client)
        .with_field("topic", topic)
        .with_field("message_size", message_size)
        .with_field("buffer_size", buffer_size)
        .with_field("max_buffer_size", max_buffer_size)
}

#[allow(dead_code)]
pub fn buffer_overflow(client: &str, topic: &str) -> Event {
    Event::new(ProducerEventKind::BufferOverflow.notification_name())
        .with_field("client_id", client)
        .with_field("topic", topic)
}

pub fn deliver_messages(client: &str, count: u64, attempts: u64, duration: Duration) -> Event {
    Event::new(ProducerEventKind::DeliveryCompleted.notification_name())
        .with_field("client_id", client)
        .with_field("delivered_message_count", count)
        .with_field("attempts", attempts)
        .with_duration(duration)
}

#[allow(dead_code)]
pub fn ack_message(client: &str, topic: &str, delay: f64) -> Event {
    Event::new(ProducerEventKind::MessageAcked.notification_name())
        .with_field("client_id", client)
        .with_field("topic", topic)
        .with_field("delay", delay)
}

#[allow(dead_code)]
pub fn topic_error(client: &str, topic: &str) -> Event {
    Event::new(ProducerEventKind::TopicError.notification_name())
        .with_field("client_id", client)
        .with_field("topic", topic)
}
