//! Tests for event payload access.

use super::*;
use serde_json::json;

fn produce_event() -> Event {
    Event::new("produce_message.producer.kafka")
        .with_field("client_id", "c1")
        .with_field("topic", "t1")
        .with_field("message_size", 512)
        .with_field("delay", 0.25)
}

#[test]
fn test_fetch_str_returns_value() {
    let event = produce_event();
    assert_eq!(event.fetch_str("client_id"), Ok("c1"));
}

#[test]
fn test_fetch_missing_field_fails() {
    let event = produce_event();
    let err = event.fetch_u64("buffer_size").unwrap_err();
    assert_eq!(
        err,
        TranslationError::MissingField {
            event: "produce_message.producer.kafka".to_string(),
            field: "buffer_size".to_string(),
        }
    );
}

#[test]
fn test_fetch_wrong_type_is_invalid_field() {
    let event = produce_event();
    let err = event.fetch_u64("topic").unwrap_err();
    assert!(
        matches!(err, TranslationError::InvalidField { ref field, .. } if field == "topic"),
        "expected InvalidField, got: {:?}",
        err
    );
}

#[test]
fn test_fetch_f64_accepts_integers_and_floats() {
    let event = produce_event();
    assert_eq!(event.fetch_f64("message_size"), Ok(512.0));
    assert_eq!(event.fetch_f64("delay"), Ok(0.25));
}

#[test]
fn test_fetch_u64_rejects_negative_and_fractional_numbers() {
    let event = Event::new("deliver_messages.producer.kafka")
        .with_field("delivered_message_count", -1)
        .with_field("attempts", 1.5);

    assert!(event.fetch_u64("delivered_message_count").is_err());
    assert!(event.fetch_u64("attempts").is_err());
}

#[test]
fn test_has_field_ignores_value() {
    let event = Event::new("deliver_messages.producer.kafka")
        .with_field("exception", Value::Null)
        .with_field("retry", false);

    assert!(event.has_field("exception"));
    assert!(event.has_field("retry"));
    assert!(!event.has_field("exception_object"));
}

#[test]
fn test_fetch_duration_missing_reports_duration_field() {
    let event = Event::new("deliver_messages.producer.kafka");
    let err = event.fetch_duration().unwrap_err();
    assert_eq!(err.field(), "duration");
}

#[test]
fn test_deserialize_event_with_duration_in_seconds() {
    let event: Event = serde_json::from_value(json!({
        "name": "deliver_messages.producer.kafka",
        "payload": {"client_id": "c1", "delivered_message_count": 10, "attempts": 3},
        "duration": 0.05
    }))
    .unwrap();

    assert_eq!(event.duration, Some(Duration::from_secs_f64(0.05)));
    assert_eq!(event.fetch_u64("delivered_message_count"), Ok(10));
}

#[test]
fn test_deserialize_event_without_payload_or_duration() {
    let event: Event =
        serde_json::from_value(json!({"name": "topic_error.producer.kafka"})).unwrap();

    assert!(event.payload.is_empty());
    assert_eq!(event.duration, None);
}

#[test]
fn test_deserialize_negative_duration_fails() {
    let result = serde_json::from_value::<Event>(json!({
        "name": "deliver_messages.producer.kafka",
        "duration": -1.0
    }));

    assert!(result.is_err());
}

#[test]
fn test_serialize_duration_as_seconds() {
    let event = Event::new("ack_message.producer.kafka").with_duration(Duration::from_millis(1500));
    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["duration"], json!(1.5));
}
