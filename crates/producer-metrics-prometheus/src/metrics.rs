//! Prometheus-backed metrics sink.

use crate::config::BucketConfig;
use producer_metrics_core::{LabelSet, MetricDeclaration, MetricKind, MetricsSink, SinkError};
use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};
use tracing::{debug, warn};

#[derive(Clone)]
enum Family {
    Counter(CounterVec),
    Gauge(GaugeVec),
    Histogram(HistogramVec),
}

/// A registered metric family and the label names fixed at declaration
#[derive(Clone)]
struct Registered {
    kind: MetricKind,
    labels: &'static [&'static str],
    family: Family,
}

/// Metrics sink that records into a Prometheus registry.
///
/// Every metric must be declared before it is recorded. Updates for undeclared
/// metrics, for the wrong kind, or with label keys that differ from the
/// declaration are logged and dropped.
pub struct PrometheusMetricsSink {
    registry: Registry,
    buckets: BucketConfig,
    families: RwLock<HashMap<String, Registered>>,
}

impl PrometheusMetricsSink {
    pub fn new(registry: Registry, buckets: BucketConfig) -> Self {
        Self {
            registry,
            buckets,
            families: RwLock::new(HashMap::new()),
        }
    }

    /// Registry the metrics are registered with
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn buckets(&self) -> &BucketConfig {
        &self.buckets
    }

    /// Render every metric in the registry in the Prometheus text format
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }

    fn build_family(&self, declaration: &MetricDeclaration) -> prometheus::Result<Family> {
        let labels = declaration.labels;
        let family = match declaration.kind {
            MetricKind::Counter => Family::Counter(CounterVec::new(
                Opts::new(declaration.name, declaration.doc),
                labels,
            )?),
            MetricKind::Gauge => Family::Gauge(GaugeVec::new(
                Opts::new(declaration.name, declaration.doc),
                labels,
            )?),
            MetricKind::Histogram => {
                let buckets = declaration
                    .buckets
                    .map(|spec| self.buckets.resolve(&spec))
                    .unwrap_or_default();
                Family::Histogram(HistogramVec::new(
                    HistogramOpts::new(declaration.name, declaration.doc).buckets(buckets),
                    labels,
                )?)
            }
        };

        match &family {
            Family::Counter(vec) => self.registry.register(Box::new(vec.clone()))?,
            Family::Gauge(vec) => self.registry.register(Box::new(vec.clone()))?,
            Family::Histogram(vec) => self.registry.register(Box::new(vec.clone()))?,
        }

        Ok(family)
    }

    /// Find a declared family of the expected kind and order label values for it
    fn lookup<'a>(
        &self,
        name: &str,
        kind: MetricKind,
        labels: &'a LabelSet,
    ) -> Option<(Family, Vec<&'a str>)> {
        let registered = {
            let families = self.families.read().unwrap_or_else(PoisonError::into_inner);
            families.get(name).cloned()
        };

        let Some(registered) = registered else {
            warn!(metric = name, "Dropping update for undeclared metric");
            return None;
        };

        if registered.kind != kind {
            warn!(
                metric = name,
                declared = %registered.kind,
                requested = %kind,
                "Dropping update for metric of a different kind"
            );
            return None;
        }

        match labels.values_for(registered.labels) {
            Some(values) => Some((registered.family, values)),
            None => {
                warn!(
                    metric = name,
                    labels = %labels,
                    expected = ?registered.labels,
                    "Dropping update with mismatched label keys"
                );
                None
            }
        }
    }
}

impl MetricsSink for PrometheusMetricsSink {
    fn declare(&self, declaration: &MetricDeclaration) -> Result<(), SinkError> {
        declaration.validate()?;

        let mut families = self.families.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = families.get(declaration.name) {
            if existing.kind != declaration.kind {
                return Err(SinkError::KindMismatch {
                    name: declaration.name.to_string(),
                    existing: existing.kind,
                    requested: declaration.kind,
                });
            }
            return Ok(());
        }

        let family = self
            .build_family(declaration)
            .map_err(|e| SinkError::Registration {
                name: declaration.name.to_string(),
                message: e.to_string(),
            })?;

        families.insert(
            declaration.name.to_string(),
            Registered {
                kind: declaration.kind,
                labels: declaration.labels,
                family,
            },
        );
        debug!(metric = declaration.name, kind = %declaration.kind, "Declared metric");
        Ok(())
    }

    fn increment(&self, name: &str, labels: &LabelSet, delta: u64) {
        if let Some((Family::Counter(vec), values)) = self.lookup(name, MetricKind::Counter, labels)
        {
            match vec.get_metric_with_label_values(values.as_slice()) {
                // u64 to f64 conversion is exact for realistic counts (< 2^53)
                Ok(counter) => counter.inc_by(delta as f64),
                Err(e) => warn!(metric = name, error = %e, "Failed to resolve counter"),
            }
        }
    }

    fn observe(&self, name: &str, labels: &LabelSet, value: f64) {
        if !value.is_finite() {
            warn!(metric = name, value, "Dropping non-finite observation");
            return;
        }
        if let Some((Family::Histogram(vec), values)) =
            self.lookup(name, MetricKind::Histogram, labels)
        {
            match vec.get_metric_with_label_values(values.as_slice()) {
                Ok(histogram) => histogram.observe(value),
                Err(e) => warn!(metric = name, error = %e, "Failed to resolve histogram"),
            }
        }
    }

    fn set(&self, name: &str, labels: &LabelSet, value: f64) {
        if !value.is_finite() {
            warn!(metric = name, value, "Dropping non-finite gauge value");
            return;
        }
        if let Some((Family::Gauge(vec), values)) = self.lookup(name, MetricKind::Gauge, labels) {
            match vec.get_metric_with_label_values(values.as_slice()) {
                Ok(gauge) => gauge.set(value),
                Err(e) => warn!(metric = name, error = %e, "Failed to resolve gauge"),
            }
        }
    }
}

impl std::fmt::Debug for PrometheusMetricsSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut declared: Vec<String> = self
            .families
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        declared.sort();
        f.debug_struct("PrometheusMetricsSink")
            .field("declared", &declared)
            .field("buckets", &self.buckets)
            .finish()
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
