//! Per-kind mapping from a raw metric name to registry handles.
//!
//! Each Dropwizard kind expands into a fixed set of Prometheus families:
//!
//! | kind      | counters      | gauges                                                    |
//! |-----------|---------------|-----------------------------------------------------------|
//! | counter   | `name`        |                                                           |
//! | gauge     |               | `name`                                                    |
//! | meter     | `name_count`  | `name{rate}`                                              |
//! | histogram | `name_count`  | `name{percentile}`, `name_min/max/mean/stddev`            |
//! | timer     | `name_count`  | `name_rate{rate}`, `name{percentile}`, `name_min/max/...` |
//!
//! Labels extracted by [`canonicalize`] are part of every schema so all
//! families of one metric agree on their dynamic dimensions.

use std::sync::Arc;

use crate::error::Result;
use crate::naming::{canonicalize, Labels};
use crate::registry::{CounterVec, GaugeVec, Registry};

/// Label key of meter/timer rate series.
pub const RATE_LABEL: &str = "rate";
/// Label key of histogram/timer percentile series.
pub const PERCENTILE_LABEL: &str = "percentile";

/// Dropwizard metric kinds, one per snapshot group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
    Meter,
    Histogram,
    Timer,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Counter,
        MetricKind::Gauge,
        MetricKind::Meter,
        MetricKind::Histogram,
        MetricKind::Timer,
    ];

    /// Kind for a top-level snapshot key (`counters`, `gauges`, ...).
    pub fn from_group(group: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.group() == group)
    }

    /// Top-level snapshot key holding metrics of this kind.
    pub fn group(self) -> &'static str {
        match self {
            MetricKind::Counter => "counters",
            MetricKind::Gauge => "gauges",
            MetricKind::Meter => "meters",
            MetricKind::Histogram => "histograms",
            MetricKind::Timer => "timers",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Meter => "meter",
            MetricKind::Histogram => "histogram",
            MetricKind::Timer => "timer",
        }
    }
}

/// Gauges shared by histograms and timers.
pub struct Distribution {
    pub percentiles: Arc<GaugeVec>,
    pub min: Arc<GaugeVec>,
    pub max: Arc<GaugeVec>,
    pub mean: Arc<GaugeVec>,
    pub stddev: Arc<GaugeVec>,
}

impl Distribution {
    fn check_schema(&self, base: &[&str]) -> Result<()> {
        self.percentiles.check_schema(&with_key(base, PERCENTILE_LABEL))?;
        for plain in [&self.min, &self.max, &self.mean, &self.stddev] {
            plain.check_schema(base)?;
        }
        Ok(())
    }
}

pub struct MeterHandles {
    pub count: Arc<CounterVec>,
    pub rates: Arc<GaugeVec>,
}

pub struct HistogramHandles {
    pub count: Arc<CounterVec>,
    pub distribution: Distribution,
}

pub struct TimerHandles {
    pub count: Arc<CounterVec>,
    pub rates: Arc<GaugeVec>,
    pub distribution: Distribution,
}

/// Handle bundle for one metric, by kind.
pub enum Handles {
    Counter(Arc<CounterVec>),
    Gauge(Arc<GaugeVec>),
    Meter(MeterHandles),
    Histogram(HistogramHandles),
    Timer(TimerHandles),
}

/// Result of resolving one raw metric name.
pub struct Resolved {
    /// Canonical name.
    pub name: String,
    /// Dynamic labels derived from the raw name.
    pub labels: Labels,
    pub handles: Handles,
    /// `true` if any family of this metric was registered by this call.
    pub created: bool,
}

impl Resolved {
    /// Label pairs for series without an extra dimension.
    pub fn label_pairs(&self) -> Vec<(&str, &str)> {
        self.labels
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Fails with `LabelMismatch` if any family of this metric was first
    /// registered with a different schema. Nothing is written either way.
    pub fn check_schema(&self) -> Result<()> {
        let base: Vec<&str> = self.labels.keys().map(String::as_str).collect();
        match &self.handles {
            Handles::Counter(c) => c.check_schema(&base),
            Handles::Gauge(g) => g.check_schema(&base),
            Handles::Meter(m) => {
                m.count.check_schema(&base)?;
                m.rates.check_schema(&with_key(&base, RATE_LABEL))
            }
            Handles::Histogram(h) => {
                h.count.check_schema(&base)?;
                h.distribution.check_schema(&base)
            }
            Handles::Timer(t) => {
                t.count.check_schema(&base)?;
                t.rates.check_schema(&with_key(&base, RATE_LABEL))?;
                t.distribution.check_schema(&base)
            }
        }
    }

    /// Label pairs plus one extra dimension (`rate`, `percentile`).
    pub fn label_pairs_with<'a>(&'a self, key: &'a str, value: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut pairs = self.label_pairs();
        pairs.push((key, value));
        pairs
    }
}

/// Resolves raw metric names into registry handles.
pub struct Mapper {
    registry: Arc<Registry>,
}

impl Mapper {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Fetch (creating on first sight) every family `kind` needs for `metric`.
    /// `units` only feeds help text for meters and timers.
    pub fn resolve(&self, kind: MetricKind, metric: &str, units: Option<&str>) -> Resolved {
        let (name, labels) = canonicalize(metric);
        let base: Vec<&str> = labels.keys().map(String::as_str).collect();
        let units = units.unwrap_or("unknown units");

        let (handles, created) = match kind {
            MetricKind::Counter => {
                let help = format!("{metric} (counter)");
                let (c, created) = self.registry.counters().fetch(&name, &help, &base);
                (Handles::Counter(c), created)
            }
            MetricKind::Gauge => {
                let help = format!("{metric} (gauge)");
                let (g, created) = self.registry.gauges().fetch(&name, &help, &base);
                (Handles::Gauge(g), created)
            }
            MetricKind::Meter => {
                let help = format!("{metric} (meter, rates in {units})");
                let (count, c1) = self.counter(&format!("{name}_count"), &help, &base);
                let (rates, c2) = self.gauge(&name, &help, &with_key(&base, RATE_LABEL));
                (Handles::Meter(MeterHandles { count, rates }), c1 || c2)
            }
            MetricKind::Histogram => {
                let help = format!("{metric} (histogram)");
                let (count, c1) = self.counter(&format!("{name}_count"), &help, &base);
                let (distribution, c2) = self.distribution(&name, &help, &base);
                (
                    Handles::Histogram(HistogramHandles {
                        count,
                        distribution,
                    }),
                    c1 || c2,
                )
            }
            MetricKind::Timer => {
                let help = format!("{metric} (timer, rates in {units})");
                let (count, c1) = self.counter(&format!("{name}_count"), &help, &base);
                let (rates, c2) =
                    self.gauge(&format!("{name}_rate"), &help, &with_key(&base, RATE_LABEL));
                let (distribution, c3) = self.distribution(&name, &help, &base);
                (
                    Handles::Timer(TimerHandles {
                        count,
                        rates,
                        distribution,
                    }),
                    c1 || c2 || c3,
                )
            }
        };

        Resolved {
            name,
            labels,
            handles,
            created,
        }
    }

    fn counter(&self, name: &str, help: &str, keys: &[&str]) -> (Arc<CounterVec>, bool) {
        self.registry.counters().fetch(name, help, keys)
    }

    fn gauge(&self, name: &str, help: &str, keys: &[&str]) -> (Arc<GaugeVec>, bool) {
        self.registry.gauges().fetch(name, help, keys)
    }

    fn distribution(&self, name: &str, help: &str, base: &[&str]) -> (Distribution, bool) {
        let (percentiles, c1) = self.gauge(name, help, &with_key(base, PERCENTILE_LABEL));
        let (min, c2) = self.gauge(&format!("{name}_min"), help, base);
        let (max, c3) = self.gauge(&format!("{name}_max"), help, base);
        let (mean, c4) = self.gauge(&format!("{name}_mean"), help, base);
        let (stddev, c5) = self.gauge(&format!("{name}_stddev"), help, base);
        (
            Distribution {
                percentiles,
                min,
                max,
                mean,
                stddev,
            },
            c1 || c2 || c3 || c4 || c5,
        )
    }
}

fn with_key<'a>(base: &[&'a str], key: &'a str) -> Vec<&'a str> {
    let mut keys = base.to_vec();
    keys.push(key);
    keys
}
