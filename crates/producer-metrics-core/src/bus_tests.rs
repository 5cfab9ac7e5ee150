//! Tests for the in-process notification bus.

use super::*;
use crate::TranslationError;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

fn counting_handler(counter: Arc<AtomicUsize>) -> Handler {
    Arc::new(move |_event: &Event| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

#[test]
fn test_notification_name_joins_event_and_scope() {
    assert_eq!(
        notification_name("produce_message", "producer.kafka"),
        "produce_message.producer.kafka"
    );
}

#[test]
fn test_unbound_event_is_ignored() {
    let bus = EventBus::new();
    let event = Event::new("unknown_event.producer.kafka");

    assert_eq!(bus.publish(&event), Ok(Dispatch::Ignored));
}

#[test]
fn test_publish_invokes_bound_handler() {
    let bus = EventBus::new();
    let counter = Arc::new(AtomicUsize::new(0));
    bus.subscribe("topic_error.producer.kafka", counting_handler(Arc::clone(&counter)));

    let result = bus.publish(&Event::new("topic_error.producer.kafka"));

    assert_eq!(result, Ok(Dispatch::Handled(1)));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handlers_run_in_subscription_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for id in 0..3 {
        let order = Arc::clone(&order);
        bus.subscribe(
            "ack_message.producer.kafka",
            Arc::new(move |_event: &Event| {
                order.lock().unwrap().push(id);
                Ok(())
            }),
        );
    }

    bus.publish(&Event::new("ack_message.producer.kafka")).unwrap();

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn test_handler_error_propagates_and_stops_dispatch() {
    let bus = EventBus::new();
    let counter = Arc::new(AtomicUsize::new(0));

    bus.subscribe(
        "produce_message.producer.kafka",
        Arc::new(|event: &Event| event.fetch_str("client_id").map(|_| ())),
    );
    bus.subscribe("produce_message.producer.kafka", counting_handler(Arc::clone(&counter)));

    let err = bus
        .publish(&Event::new("produce_message.producer.kafka"))
        .unwrap_err();

    assert!(matches!(err, TranslationError::MissingField { .. }));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_subscriptions_are_listed() {
    let bus = EventBus::new();
    let counter = Arc::new(AtomicUsize::new(0));
    bus.subscribe("b.scope", counting_handler(Arc::clone(&counter)));
    bus.subscribe("a.scope", counting_handler(counter));

    assert!(bus.is_subscribed("a.scope"));
    assert!(!bus.is_subscribed("c.scope"));
    assert_eq!(bus.subscriptions(), vec!["a.scope", "b.scope"]);
}
