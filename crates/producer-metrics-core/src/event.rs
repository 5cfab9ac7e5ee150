//! # Producer Events
//!
//! A producer notification as delivered by the event source: its full name,
//! a payload of named fields, and the elapsed time of the instrumented block.
//!
//! Field accessors fail with [`TranslationError`] so handlers can extract every
//! value they need with `?` before making any sink call.

use crate::{TranslationError, TranslationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, time::Duration};

/// Named fields carried by a notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(HashMap<String, Value>);

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value, if present
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Check whether the field key is present, regardless of its value
    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Insert or replace a field
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Remove a field, returning its value if it was present
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Payload {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A single producer lifecycle notification.
///
/// `name` is the full notification name, e.g. `produce_message.producer.kafka`.
/// `duration` is serialized as fractional seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,

    #[serde(default)]
    pub payload: Payload,

    #[serde(default, with = "duration_seconds")]
    pub duration: Option<Duration>,
}

impl Event {
    /// Create an event with an empty payload and no duration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Payload::new(),
            duration: None,
        }
    }

    /// Add a payload field
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(field, value);
        self
    }

    /// Set the elapsed time of the instrumented operation
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Check whether the payload carries a key, whatever its value
    pub fn has_field(&self, field: &str) -> bool {
        self.payload.contains_key(field)
    }

    /// Fetch a required field
    ///
    /// # Errors
    /// - `TranslationError::MissingField` - the key is absent
    pub fn fetch(&self, field: &str) -> TranslationResult<&Value> {
        self.payload
            .get(field)
            .ok_or_else(|| TranslationError::MissingField {
                event: self.name.clone(),
                field: field.to_string(),
            })
    }

    /// Fetch a required string field
    pub fn fetch_str(&self, field: &str) -> TranslationResult<&str> {
        self.fetch(field)?
            .as_str()
            .ok_or_else(|| self.invalid(field, "string"))
    }

    /// Fetch a required non-negative integer field
    pub fn fetch_u64(&self, field: &str) -> TranslationResult<u64> {
        self.fetch(field)?
            .as_u64()
            .ok_or_else(|| self.invalid(field, "non-negative integer"))
    }

    /// Fetch a required numeric field as a float
    pub fn fetch_f64(&self, field: &str) -> TranslationResult<f64> {
        self.fetch(field)?
            .as_f64()
            .ok_or_else(|| self.invalid(field, "number"))
    }

    /// Fetch the event duration, reported as the `duration` field when absent
    pub fn fetch_duration(&self) -> TranslationResult<Duration> {
        self.duration.ok_or_else(|| TranslationError::MissingField {
            event: self.name.clone(),
            field: "duration".to_string(),
        })
    }

    fn invalid(&self, field: &str, expected: &str) -> TranslationError {
        TranslationError::InvalidField {
            event: self.name.clone(),
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }
}

mod duration_seconds {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            Some(seconds) => Duration::try_from_secs_f64(seconds)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid duration {}: {}", seconds, e))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
