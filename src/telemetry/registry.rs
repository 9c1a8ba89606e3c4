use prometheus::{Encoder, Gauge, IntCounter, TextEncoder};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use super::metrics::{MetricAction, MetricDescriptor, MetricKind};
use crate::error::RegistryError;

#[derive(Clone)]
enum Metric {
    Counter(IntCounter),
    Gauge(Gauge),
}

impl Metric {
    fn kind(&self) -> MetricKind {
        match self {
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Gauge(_) => MetricKind::Gauge,
        }
    }

    fn value(&self) -> MetricValue {
        match self {
            Metric::Counter(c) => MetricValue::Counter(c.get()),
            Metric::Gauge(g) => MetricValue::Gauge(g.get()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Counter(u64),
    Gauge(f64),
}

/// Name -> counter/gauge map shared by the bridge loop and the scrape path.
///
/// Values are prometheus atomics, so the lock only guards the name table;
/// it is written during registration and read everywhere else.
pub struct MetricsRegistry {
    metrics: RwLock<HashMap<String, Metric>>,
    exposition: prometheus::Registry,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            metrics: RwLock::new(HashMap::new()),
            exposition: prometheus::Registry::new(),
        }
    }

    /// Builds a registry holding every descriptor in `descriptors`.
    pub fn with_descriptors(descriptors: &[MetricDescriptor]) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    pub fn register(&self, descriptor: &MetricDescriptor) -> Result<(), RegistryError> {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        if metrics.contains_key(descriptor.name) {
            return Err(RegistryError::DuplicateMetric(descriptor.name.to_string()));
        }

        let metric = match descriptor.kind {
            MetricKind::Counter => {
                let counter = IntCounter::new(descriptor.name, descriptor.help)?;
                self.exposition.register(Box::new(counter.clone()))?;
                Metric::Counter(counter)
            }
            MetricKind::Gauge => {
                let gauge = Gauge::new(descriptor.name, descriptor.help)?;
                self.exposition.register(Box::new(gauge.clone()))?;
                Metric::Gauge(gauge)
            }
        };

        metrics.insert(descriptor.name.to_string(), metric);
        Ok(())
    }

    pub fn increment(&self, name: &str) -> Result<(), RegistryError> {
        match self.lookup(name)? {
            Metric::Counter(counter) => {
                counter.inc();
                Ok(())
            }
            other => Err(RegistryError::KindMismatch {
                name: name.to_string(),
                expected: MetricKind::Counter,
                actual: other.kind(),
            }),
        }
    }

    pub fn set(&self, name: &str, value: f64) -> Result<(), RegistryError> {
        match self.lookup(name)? {
            Metric::Gauge(gauge) => {
                gauge.set(value);
                Ok(())
            }
            other => Err(RegistryError::KindMismatch {
                name: name.to_string(),
                expected: MetricKind::Gauge,
                actual: other.kind(),
            }),
        }
    }

    pub fn apply(&self, action: MetricAction) -> Result<(), RegistryError> {
        match action {
            MetricAction::Increment(name) => self.increment(name),
            MetricAction::Set(name, value) => self.set(name, value),
        }
    }

    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.lookup(name).ok().map(|m| m.value())
    }

    /// Current value of every metric. Each value is read atomically; the map
    /// as a whole is not a single point in time.
    pub fn snapshot(&self) -> BTreeMap<String, MetricValue> {
        let metrics = self.metrics.read().unwrap_or_else(PoisonError::into_inner);
        metrics
            .iter()
            .map(|(name, metric)| (name.clone(), metric.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prometheus text exposition of all registered metrics.
    pub fn gather_text(&self) -> Result<String, RegistryError> {
        let families = self.exposition.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn lookup(&self, name: &str) -> Result<Metric, RegistryError> {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownMetric(name.to_string()))
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
