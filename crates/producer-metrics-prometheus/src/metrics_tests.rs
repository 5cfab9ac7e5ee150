//! Tests for [`PrometheusMetricsSink`].

use super::*;
use producer_metrics_core::{declaration::names, declare_all, find_declaration, PRODUCER_METRICS};

fn declared_sink() -> PrometheusMetricsSink {
    let sink = PrometheusMetricsSink::new(Registry::new(), BucketConfig::default());
    declare_all(&sink).unwrap();
    sink
}

fn text(sink: &PrometheusMetricsSink) -> String {
    sink.encode_text().unwrap()
}

mod declare_tests {
    use super::*;

    #[test]
    fn test_declare_all_registers_every_family() {
        let sink = declared_sink();

        // Families without samples are not exported; record one of each
        for declaration in &PRODUCER_METRICS {
            let labels = match declaration.labels.len() {
                1 => LabelSet::client("c1"),
                _ => LabelSet::client_topic("c1", "t1"),
            };
            match declaration.kind {
                MetricKind::Counter => sink.increment(declaration.name, &labels, 1),
                MetricKind::Gauge => sink.set(declaration.name, &labels, 1.0),
                MetricKind::Histogram => sink.observe(declaration.name, &labels, 1.0),
            }
        }

        let families = sink.registry().gather();
        assert_eq!(families.len(), PRODUCER_METRICS.len());
    }

    #[test]
    fn test_redeclare_is_idempotent() {
        let sink = declared_sink();
        assert!(declare_all(&sink).is_ok());
    }

    #[test]
    fn test_redeclare_with_other_kind_fails() {
        let sink = declared_sink();
        let mut declaration = *find_declaration(names::BUFFER_SIZE).unwrap();
        declaration.kind = MetricKind::Counter;

        let err = sink.declare(&declaration).unwrap_err();
        assert!(matches!(err, SinkError::KindMismatch { .. }));
    }

    #[test]
    fn test_name_taken_in_registry_is_registration_error() {
        let registry = Registry::new();
        let first = PrometheusMetricsSink::new(registry.clone(), BucketConfig::default());
        let second = PrometheusMetricsSink::new(registry, BucketConfig::default());
        declare_all(&first).unwrap();

        let err = declare_all(&second).unwrap_err();
        assert!(
            matches!(err, SinkError::Registration { ref name, .. } if name == names::MESSAGES),
            "expected Registration, got: {:?}",
            err
        );
    }
}

mod recording_tests {
    use super::*;

    #[test]
    fn test_counter_increments_by_delta() {
        let sink = declared_sink();
        let labels = LabelSet::client("c1");

        sink.increment(names::DELIVERED_MESSAGES, &labels, 10);
        sink.increment(names::DELIVERED_MESSAGES, &labels, 5);

        assert!(text(&sink).contains(r#"kafka_producer_delivered_messages{client="c1"} 15"#));
    }

    #[test]
    fn test_gauge_sets_value() {
        let sink = declared_sink();

        sink.set(names::BUFFER_FILL_RATIO, &LabelSet::client("c1"), 0.2);

        let output = text(&sink);
        assert!(output.contains("# HELP kafka_producer_buffer_fill_ratio The current ratio of Kafka producer buffer in use"));
        assert!(output.contains(r#"kafka_producer_buffer_fill_ratio{client="c1"} 0.2"#));
    }

    #[test]
    fn test_histogram_uses_explicit_buckets() {
        let sink = declared_sink();

        sink.observe(names::DELIVERY_ATTEMPTS, &LabelSet::client("c1"), 3.0);

        let output = text(&sink);
        assert!(output.contains(r#"kafka_producer_delivery_attempts_bucket{client="c1",le="0"} 0"#));
        assert!(output.contains(r#"kafka_producer_delivery_attempts_bucket{client="c1",le="6"} 1"#));
        assert!(output.contains(r#"kafka_producer_delivery_attempts_bucket{client="c1",le="30"} 1"#));
        assert!(output.contains(r#"kafka_producer_delivery_attempts_count{client="c1"} 1"#));
    }

    #[test]
    fn test_histogram_uses_configured_preset() {
        let config = BucketConfig::from_toml_str("[presets]\nnetwork = [0.5, 1.0]\n").unwrap();
        let sink = PrometheusMetricsSink::new(Registry::new(), config);
        declare_all(&sink).unwrap();

        sink.observe(names::ACK_LATENCY, &LabelSet::client_topic("c1", "t1"), 0.25);

        let output = text(&sink);
        assert!(output.contains(r#"kafka_producer_ack_latency_bucket{client="c1",topic="t1",le="0.5"} 1"#));
        assert!(!output.contains(r#"le="0.005""#));
    }
}

mod dropped_update_tests {
    use super::*;

    #[test]
    fn test_undeclared_metric_is_dropped() {
        let sink = PrometheusMetricsSink::new(Registry::new(), BucketConfig::default());

        sink.increment(names::MESSAGES, &LabelSet::client_topic("c1", "t1"), 1);

        assert!(sink.registry().gather().is_empty());
    }

    #[test]
    fn test_mismatched_labels_are_dropped() {
        let sink = declared_sink();

        sink.set(names::BUFFER_SIZE, &LabelSet::client_topic("c1", "t1"), 40.0);
        sink.increment(names::MESSAGES, &LabelSet::client("c1"), 1);

        assert!(sink.registry().gather().is_empty());
    }

    #[test]
    fn test_wrong_kind_is_dropped() {
        let sink = declared_sink();

        sink.observe(names::MESSAGES, &LabelSet::client_topic("c1", "t1"), 1.0);

        assert!(sink.registry().gather().is_empty());
    }

    #[test]
    fn test_non_finite_values_are_dropped() {
        let sink = declared_sink();

        sink.set(names::BUFFER_FILL_RATIO, &LabelSet::client("c1"), f64::INFINITY);
        sink.set(names::BUFFER_FILL_RATIO, &LabelSet::client("c1"), f64::NAN);
        sink.observe(names::ACK_LATENCY, &LabelSet::client_topic("c1", "t1"), f64::NAN);

        assert!(sink.registry().gather().is_empty());
    }
}
