//! # Producer Event Translator
//!
//! Turns Kafka producer notifications into metric updates.
//!
//! Each [`ProducerEventKind`] maps to exactly one handler. A handler extracts every
//! payload field it needs before making any sink call, so a missing or malformed
//! field fails the whole event and nothing is recorded for it.
//!
//! Label shapes differ per handler and must stay as they are:
//!
//! | Event | `{client, topic}` | `{client}` |
//! |---|---|---|
//! | `produce_message` | messages, message size | buffer size, max buffer size, fill ratio |
//! | `buffer_overflow` | buffer overflows | |
//! | `deliver_messages` | | delivery errors, latency, delivered messages, attempts |
//! | `ack_message` | ack messages, ack latency | |
//! | `topic_error` | ack errors | |

use crate::{
    bus::{notification_name, Dispatch, Handler, NotificationBus},
    declaration::names,
    event::Event,
    labels::{LabelSet, CLIENT},
    sink::MetricsSink,
    TranslationResult,
};
use std::{fmt, str::FromStr, sync::Arc};
use tracing::{debug, warn};

/// Event-source scope the producer publishes on
pub const PRODUCER_SCOPE: &str = "producer.kafka";

/// Producer notifications with a bound handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerEventKind {
    /// A message was appended to the producer buffer
    MessageProduced,
    /// The producer buffer was full
    BufferOverflow,
    /// A batch delivery to the brokers finished, successfully or not
    DeliveryCompleted,
    /// A broker acknowledged a message
    MessageAcked,
    /// A broker reported an error for a topic
    TopicError,
}

impl ProducerEventKind {
    pub const ALL: [ProducerEventKind; 5] = [
        Self::MessageProduced,
        Self::BufferOverflow,
        Self::DeliveryCompleted,
        Self::MessageAcked,
        Self::TopicError,
    ];

    /// Event identifier within the producer scope
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageProduced => "produce_message",
            Self::BufferOverflow => "buffer_overflow",
            Self::DeliveryCompleted => "deliver_messages",
            Self::MessageAcked => "ack_message",
            Self::TopicError => "topic_error",
        }
    }

    /// Full notification name, e.g. `produce_message.producer.kafka`
    pub fn notification_name(&self) -> String {
        notification_name(self.as_str(), PRODUCER_SCOPE)
    }

    /// Resolve a full notification name to a kind, if it belongs to the producer scope
    pub fn from_notification_name(name: &str) -> Option<Self> {
        let event = name.strip_suffix(PRODUCER_SCOPE)?.strip_suffix('.')?;
        event.parse().ok()
    }
}

impl fmt::Display for ProducerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProducerEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown producer event: {}", s))
    }
}

/// Translates producer notifications into metric sink calls.
///
/// Holds nothing but the sink, so one translator can serve concurrent deliveries.
pub struct ProducerTranslator<S: MetricsSink + ?Sized> {
    sink: Arc<S>,
}

impl<S: MetricsSink + ?Sized> Clone for ProducerTranslator<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: MetricsSink + ?Sized> fmt::Debug for ProducerTranslator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerTranslator").finish_non_exhaustive()
    }
}

impl<S: MetricsSink + ?Sized + 'static> ProducerTranslator<S> {
    /// Create a translator writing to the given sink
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    /// Bind one handler per producer event on the bus
    pub fn attach<B: NotificationBus + ?Sized>(&self, bus: &B) {
        for kind in ProducerEventKind::ALL {
            let translator = self.clone();
            let handle = Self::handler_for(kind);
            let handler: Handler = Arc::new(move |event: &Event| handle(&translator, event));
            bus.subscribe(&kind.notification_name(), handler);
        }
        debug!(scope = PRODUCER_SCOPE, "Attached producer metrics handlers");
    }

    /// Translate an event whose kind is already known
    ///
    /// # Errors
    /// - `TranslationError::MissingField` - a required payload field or the duration is absent
    /// - `TranslationError::InvalidField` - a payload field has the wrong type
    pub fn handle(&self, kind: ProducerEventKind, event: &Event) -> TranslationResult<()> {
        Self::handler_for(kind)(self, event)
    }

    /// Translate an event by its notification name; names outside the producer
    /// scope or without a handler are ignored
    pub fn dispatch(&self, event: &Event) -> TranslationResult<Dispatch> {
        match ProducerEventKind::from_notification_name(&event.name) {
            Some(kind) => {
                self.handle(kind, event)?;
                Ok(Dispatch::Handled(1))
            }
            None => Ok(Dispatch::Ignored),
        }
    }

    fn handler_for(kind: ProducerEventKind) -> fn(&Self, &Event) -> TranslationResult<()> {
        match kind {
            ProducerEventKind::MessageProduced => Self::produce_message,
            ProducerEventKind::BufferOverflow => Self::buffer_overflow,
            ProducerEventKind::DeliveryCompleted => Self::deliver_messages,
            ProducerEventKind::MessageAcked => Self::ack_message,
            ProducerEventKind::TopicError => Self::topic_error,
        }
    }

    fn produce_message(&self, event: &Event) -> TranslationResult<()> {
        let labels = client_topic_labels(event)?;
        let message_size = event.fetch_f64("message_size")?;
        let buffer_size = event.fetch_f64("buffer_size")?;
        let max_buffer_size = event.fetch_f64("max_buffer_size")?;
        let client_labels = labels.slice(&[CLIENT]);

        self.sink.increment(names::MESSAGES, &labels, 1);
        self.sink.observe(names::MESSAGE_SIZE, &labels, message_size);
        self.sink.set(names::BUFFER_SIZE, &client_labels, buffer_size);
        self.sink
            .set(names::MAX_BUFFER_SIZE, &client_labels, max_buffer_size);

        if max_buffer_size == 0.0 {
            warn!(
                client = client_labels.get(CLIENT).unwrap_or_default(),
                buffer_size,
                "Producer reported zero max buffer size, skipping fill ratio"
            );
        } else {
            self.sink.set(
                names::BUFFER_FILL_RATIO,
                &client_labels,
                buffer_size / max_buffer_size,
            );
        }

        Ok(())
    }

    fn buffer_overflow(&self, event: &Event) -> TranslationResult<()> {
        let labels = client_topic_labels(event)?;
        self.sink.increment(names::BUFFER_OVERFLOWS, &labels, 1);
        Ok(())
    }

    fn deliver_messages(&self, event: &Event) -> TranslationResult<()> {
        let labels = LabelSet::client(event.fetch_str("client_id")?);
        let message_count = event.fetch_u64("delivered_message_count")?;
        let attempts = event.fetch_f64("attempts")?;
        let duration = event.fetch_duration()?;

        // Only the presence of the key matters, not its value
        if event.has_field("exception") {
            self.sink.increment(names::DELIVERY_ERRORS, &labels, 1);
        }
        self.sink
            .observe(names::DELIVERY_LATENCY, &labels, duration.as_secs_f64());
        self.sink
            .increment(names::DELIVERED_MESSAGES, &labels, message_count);
        self.sink.observe(names::DELIVERY_ATTEMPTS, &labels, attempts);

        Ok(())
    }

    fn ack_message(&self, event: &Event) -> TranslationResult<()> {
        let labels = client_topic_labels(event)?;
        let delay = event.fetch_f64("delay")?;

        self.sink.increment(names::ACK_MESSAGES, &labels, 1);
        self.sink.observe(names::ACK_LATENCY, &labels, delay);

        Ok(())
    }

    fn topic_error(&self, event: &Event) -> TranslationResult<()> {
        let labels = client_topic_labels(event)?;
        self.sink.increment(names::ACK_ERRORS, &labels, 1);
        Ok(())
    }
}

fn client_topic_labels(event: &Event) -> TranslationResult<LabelSet> {
    let client = event.fetch_str("client_id")?;
    let topic = event.fetch_str("topic")?;
    Ok(LabelSet::client_topic(client, topic))
}

#[cfg(test)]
#[path = "translator_tests.rs"]
mod tests;
