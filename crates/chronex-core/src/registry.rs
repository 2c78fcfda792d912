//! Dynamic metrics registry.
//!
//! Two stores, one for counters and one for gauges, each mapping a canonical
//! name to a labeled metric vector. Vectors are created on first fetch and
//! live for the process lifetime. Values are `f64` kept as bit patterns in
//! atomics; series are keyed by label values in schema order.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use crate::error::{ChronexError, Result};

/// Prometheus metric type of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    /// Name used on `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
        }
    }
}

/// Marker for the value semantics of a store.
pub trait Kind: Send + Sync + 'static {
    const TYPE: MetricType;
}

/// Counter marker: totals reported by upstream (absolute) or bumped locally.
pub struct Counter;

/// Gauge marker: point-in-time values.
pub struct Gauge;

impl Kind for Counter {
    const TYPE: MetricType = MetricType::Counter;
}

impl Kind for Gauge {
    const TYPE: MetricType = MetricType::Gauge;
}

struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }

    fn add(&self, delta: f64) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + delta).to_bits())
            });
    }
}

/// One named metric family with a fixed label-key schema.
pub struct MetricVec<K: Kind> {
    name: String,
    help: String,
    label_keys: Vec<String>,
    series: DashMap<Vec<String>, AtomicF64>,
    _kind: PhantomData<K>,
}

pub type CounterVec = MetricVec<Counter>;
pub type GaugeVec = MetricVec<Gauge>;

impl<K: Kind> MetricVec<K> {
    pub fn new(name: &str, help: &str, label_keys: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            label_keys: label_keys.iter().map(|k| k.to_string()).collect(),
            series: DashMap::new(),
            _kind: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    /// Label keys fixed at creation.
    pub fn label_keys(&self) -> &[String] {
        &self.label_keys
    }

    /// Whether `keys` is exactly the registered schema, in any order.
    pub fn has_schema(&self, keys: &[&str]) -> bool {
        let mut registered: Vec<&str> = self.label_keys.iter().map(String::as_str).collect();
        let mut requested: Vec<&str> = keys.to_vec();
        registered.sort_unstable();
        requested.sort_unstable();
        registered == requested
    }

    /// `LabelMismatch` unless `keys` is the registered schema.
    pub fn check_schema(&self, keys: &[&str]) -> Result<()> {
        if self.has_schema(keys) {
            return Ok(());
        }
        Err(ChronexError::LabelMismatch {
            name: self.name.clone(),
            expected: self.label_keys.clone(),
            got: keys.iter().map(|k| k.to_string()).collect(),
        })
    }

    /// Set the value of one series, creating it if needed.
    pub fn set(&self, labels: &[(&str, &str)], v: f64) -> Result<()> {
        let key = self.series_key(labels)?;
        if let Some(cell) = self.series.get(&key) {
            cell.store(v);
            return Ok(());
        }
        self.series
            .entry(key)
            .or_insert_with(|| AtomicF64::new(0.0))
            .store(v);
        Ok(())
    }

    /// Current value of one series, if it has been written.
    pub fn get(&self, labels: &[(&str, &str)]) -> Option<f64> {
        let key = self.series_key(labels).ok()?;
        self.series.get(&key).map(|cell| cell.load())
    }

    /// Number of label-value combinations written so far.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Point-in-time copy for collection. Series are sorted by label values.
    pub fn collect(&self) -> MetricFamily {
        let mut series: Vec<Sample> = self
            .series
            .iter()
            .map(|r| Sample {
                label_values: r.key().clone(),
                value: r.value().load(),
            })
            .collect();
        series.sort_by(|a, b| a.label_values.cmp(&b.label_values));

        MetricFamily {
            name: self.name.clone(),
            help: self.help.clone(),
            metric_type: K::TYPE,
            label_keys: self.label_keys.clone(),
            series,
        }
    }

    /// Order label values by the schema; the key set must match exactly.
    fn series_key(&self, labels: &[(&str, &str)]) -> Result<Vec<String>> {
        let mismatch = || ChronexError::LabelMismatch {
            name: self.name.clone(),
            expected: self.label_keys.clone(),
            got: labels.iter().map(|(k, _)| k.to_string()).collect(),
        };

        if labels.len() != self.label_keys.len() {
            return Err(mismatch());
        }
        self.label_keys
            .iter()
            .map(|key| {
                labels
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.to_string())
                    .ok_or_else(mismatch)
            })
            .collect()
    }
}

impl MetricVec<Counter> {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.inc_by(labels, 1.0)
    }

    /// Increment by a non-negative amount; negative deltas are ignored.
    pub fn inc_by(&self, labels: &[(&str, &str)], v: f64) -> Result<()> {
        let key = self.series_key(labels)?;
        if v < 0.0 {
            return Ok(());
        }
        self.series
            .entry(key)
            .or_insert_with(|| AtomicF64::new(0.0))
            .add(v);
        Ok(())
    }
}

/// One label-value combination and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label_values: Vec<String>,
    pub value: f64,
}

/// Collected view of one metric family, consumed by exposition encoders.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub label_keys: Vec<String>,
    pub series: Vec<Sample>,
}

/// Fetch-or-create store for one metric kind.
pub struct Store<K: Kind> {
    map: DashMap<String, Arc<MetricVec<K>>>,
    /// Names already warned about for schema drift.
    drifted: DashSet<String>,
}

impl<K: Kind> Default for Store<K> {
    fn default() -> Self {
        Self {
            map: DashMap::new(),
            drifted: DashSet::new(),
        }
    }
}

impl<K: Kind> Store<K> {
    /// Return the vector registered under `name`, creating it with `help` and
    /// `label_keys` if absent. The bool is `true` only for the call that
    /// created it. An existing entry keeps its first help text and schema.
    pub fn fetch(&self, name: &str, help: &str, label_keys: &[&str]) -> (Arc<MetricVec<K>>, bool) {
        let found = self.map.get(name).map(|r| Arc::clone(r.value()));
        if let Some(existing) = found {
            self.note_drift(&existing, label_keys);
            return (existing, false);
        }

        match self.map.entry(name.to_string()) {
            Entry::Occupied(e) => {
                let existing = Arc::clone(e.get());
                drop(e);
                self.note_drift(&existing, label_keys);
                (existing, false)
            }
            Entry::Vacant(v) => {
                let created = Arc::new(MetricVec::new(name, help, label_keys));
                v.insert(Arc::clone(&created));
                (created, true)
            }
        }
    }

    /// Warn the first time a name is fetched with a different schema; later
    /// occurrences drop to `debug`.
    fn note_drift(&self, existing: &MetricVec<K>, label_keys: &[&str]) {
        if existing.has_schema(label_keys) {
            return;
        }
        if self.drifted.insert(existing.name.clone()) {
            tracing::warn!(
                name = %existing.name,
                kind = K::TYPE.as_str(),
                registered = ?existing.label_keys,
                requested = ?label_keys,
                "label schema differs from first registration; keeping the first"
            );
        } else {
            tracing::debug!(name = %existing.name, requested = ?label_keys, "label schema drift");
        }
    }

    /// Names fetched at least once with a schema other than the registered one.
    pub fn drifted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drifted.iter().map(|n| n.key().clone()).collect();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Option<Arc<MetricVec<K>>> {
        self.map.get(name).map(|r| Arc::clone(r.value()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Collect every family in this store, sorted by name.
    pub fn collect(&self) -> Vec<MetricFamily> {
        let vecs: Vec<Arc<MetricVec<K>>> = self.map.iter().map(|r| Arc::clone(r.value())).collect();
        let mut out: Vec<MetricFamily> = vecs.iter().map(|v| v.collect()).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

/// Counter and gauge stores shared by the translator and collection path.
#[derive(Default)]
pub struct Registry {
    counters: Store<Counter>,
    gauges: Store<Gauge>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> &Store<Counter> {
        &self.counters
    }

    pub fn gauges(&self) -> &Store<Gauge> {
        &self.gauges
    }

    /// Every known family, counters and gauges, sorted by name then type.
    pub fn collect(&self) -> Vec<MetricFamily> {
        let mut out = self.counters.collect();
        out.extend(self.gauges.collect());
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.metric_type.cmp(&b.metric_type)));
        out
    }
}
