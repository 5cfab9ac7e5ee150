//! # In-Memory Metrics Sink
//!
//! Thread-safe sink that keeps every update in memory.
//! Records the raw call sequence alongside accumulated values, so tests can
//! assert both what was emitted and what a real backend would end up holding.

use crate::{
    declaration::{MetricDeclaration, MetricKind},
    labels::LabelSet,
    sink::MetricsSink,
    SinkError,
};
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

/// A single recording call received by the sink
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Increment {
        name: String,
        labels: LabelSet,
        delta: u64,
    },
    Observe {
        name: String,
        labels: LabelSet,
        value: f64,
    },
    Set {
        name: String,
        labels: LabelSet,
        value: f64,
    },
}

impl SinkCall {
    pub fn name(&self) -> &str {
        match self {
            Self::Increment { name, .. } | Self::Observe { name, .. } | Self::Set { name, .. } => {
                name
            }
        }
    }

    pub fn labels(&self) -> &LabelSet {
        match self {
            Self::Increment { labels, .. }
            | Self::Observe { labels, .. }
            | Self::Set { labels, .. } => labels,
        }
    }
}

type SeriesKey = (String, LabelSet);

#[derive(Debug, Default)]
struct SinkState {
    declarations: HashMap<String, MetricDeclaration>,
    calls: Vec<SinkCall>,
    counters: HashMap<SeriesKey, u64>,
    gauges: HashMap<SeriesKey, f64>,
    observations: HashMap<SeriesKey, Vec<f64>>,
}

/// Thread-safe in-memory metrics sink
///
/// Uses a single RwLock so the call log and accumulated values always agree.
/// Recording does not require a prior `declare`.
#[derive(Debug, Default)]
pub struct InMemoryMetricsSink {
    state: RwLock<SinkState>,
}

impl InMemoryMetricsSink {
    /// Create new empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recording call, in arrival order
    pub fn calls(&self) -> Vec<SinkCall> {
        self.read(|state| state.calls.clone())
    }

    /// Recording calls for one metric, in arrival order
    pub fn calls_for(&self, name: &str) -> Vec<SinkCall> {
        self.read(|state| {
            state
                .calls
                .iter()
                .filter(|call| call.name() == name)
                .cloned()
                .collect()
        })
    }

    pub fn call_count(&self) -> usize {
        self.read(|state| state.calls.len())
    }

    /// Accumulated counter value for a series
    pub fn counter_value(&self, name: &str, labels: &LabelSet) -> Option<u64> {
        self.read(|state| state.counters.get(&key(name, labels)).copied())
    }

    /// Last value set on a gauge series
    pub fn gauge_value(&self, name: &str, labels: &LabelSet) -> Option<f64> {
        self.read(|state| state.gauges.get(&key(name, labels)).copied())
    }

    /// All observations recorded for a histogram series
    pub fn observations(&self, name: &str, labels: &LabelSet) -> Vec<f64> {
        self.read(|state| {
            state
                .observations
                .get(&key(name, labels))
                .cloned()
                .unwrap_or_default()
        })
    }

    /// Names of declared metrics, sorted
    pub fn declared_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read(|state| state.declarations.keys().cloned().collect());
        names.sort();
        names
    }

    /// Kind a metric was declared with, if any
    pub fn declared_kind(&self, name: &str) -> Option<MetricKind> {
        self.read(|state| state.declarations.get(name).map(|d| d.kind))
    }

    /// Drop recorded calls and values, keeping declarations
    pub fn clear(&self) {
        self.write(|state| {
            state.calls.clear();
            state.counters.clear();
            state.gauges.clear();
            state.observations.clear();
        })
    }

    fn read<T>(&self, f: impl FnOnce(&SinkState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut SinkState) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

fn key(name: &str, labels: &LabelSet) -> SeriesKey {
    (name.to_string(), labels.clone())
}

impl MetricsSink for InMemoryMetricsSink {
    fn declare(&self, declaration: &MetricDeclaration) -> Result<(), SinkError> {
        declaration.validate()?;

        self.write(|state| {
            let existing = state.declarations.get(declaration.name).map(|d| d.kind);
            match existing {
                Some(kind) if kind != declaration.kind => Err(SinkError::KindMismatch {
                    name: declaration.name.to_string(),
                    existing: kind,
                    requested: declaration.kind,
                }),
                Some(_) => Ok(()),
                None => {
                    state
                        .declarations
                        .insert(declaration.name.to_string(), *declaration);
                    Ok(())
                }
            }
        })
    }

    fn increment(&self, name: &str, labels: &LabelSet, delta: u64) {
        self.write(|state| {
            *state.counters.entry(key(name, labels)).or_insert(0) += delta;
            state.calls.push(SinkCall::Increment {
                name: name.to_string(),
                labels: labels.clone(),
                delta,
            });
        })
    }

    fn observe(&self, name: &str, labels: &LabelSet, value: f64) {
        self.write(|state| {
            state
                .observations
                .entry(key(name, labels))
                .or_default()
                .push(value);
            state.calls.push(SinkCall::Observe {
                name: name.to_string(),
                labels: labels.clone(),
                value,
            });
        })
    }

    fn set(&self, name: &str, labels: &LabelSet, value: f64) {
        self.write(|state| {
            state.gauges.insert(key(name, labels), value);
            state.calls.push(SinkCall::Set {
                name: name.to_string(),
                labels: labels.clone(),
                value,
            });
        })
    }
}

#[cfg(test)]
#[path = "memory_sink_tests.rs"]
mod tests;
