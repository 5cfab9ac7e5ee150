//! Label sets attached to metric samples.
//!
//! Producer metrics use two label shapes: `{client}` for buffer state and
//! delivery metrics, and `{client, topic}` for per-topic metrics.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Label carrying the producer client identifier
pub const CLIENT: &str = "client";

/// Label carrying the destination topic
pub const TOPIC: &str = "topic";

/// Key/value tags for a single metric sample.
///
/// Keys are kept sorted so two sets with the same pairs compare and hash equal
/// regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    /// Create an empty label set
    pub fn new() -> Self {
        Self::default()
    }

    /// `{client}` label set
    pub fn client(client: impl Into<String>) -> Self {
        Self::new().with(CLIENT, client)
    }

    /// `{client, topic}` label set
    pub fn client_topic(client: impl Into<String>, topic: impl Into<String>) -> Self {
        Self::client(client).with(TOPIC, topic)
    }

    /// Add a label, replacing any previous value for the same key
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Restrict to the given keys; keys absent from this set are skipped
    pub fn slice(&self, keys: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| keys.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Label names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check that the key set is exactly `names`, in any order
    pub fn has_exact_keys(&self, names: &[&str]) -> bool {
        self.0.len() == names.len() && names.iter().all(|name| self.0.contains_key(*name))
    }

    /// Values ordered by `names`, or `None` if the key set differs
    pub fn values_for(&self, names: &[&str]) -> Option<Vec<&str>> {
        if !self.has_exact_keys(names) {
            return None;
        }
        names.iter().map(|name| self.get(name)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}=\"{}\"", key, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod tests;
