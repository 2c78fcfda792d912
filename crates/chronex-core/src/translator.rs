//! Snapshot translator: writes one snapshot into the registry.
//!
//! Top-level keys:
//! - `message`: the snapshot is an upstream error report; nothing is written.
//! - `version`: exposed as `metrics_version{version="..."} 1`.
//! - `counters`, `gauges`, `meters`, `histograms`, `timers`: one record per
//!   metric, translated independently.
//! - anything else is ignored.
//!
//! A record missing a required field (or holding it with the wrong type) is
//! skipped and reported; optional fields of the wrong type and unknown fields
//! are ignored. A metric whose families were first registered under another
//! label schema is rejected before any of its values are written.

use std::sync::Arc;

use crate::error::{ChronexError, Result};
use crate::mapper::{Distribution, Handles, Mapper, MetricKind, Resolved, PERCENTILE_LABEL, RATE_LABEL};
use crate::naming::{percentile_label, rename_rate};
use crate::registry::{GaugeVec, Registry};
use crate::snapshot::{FieldError, Node, Snapshot};

/// Name of the info-style gauge carrying the upstream metrics version.
pub const VERSION_METRIC: &str = "metrics_version";
const VERSION_LABEL: &str = "version";

/// One metric that could not be translated.
#[derive(Debug)]
pub struct MetricIssue {
    /// `None` for top-level entries such as `version`.
    pub kind: Option<MetricKind>,
    pub metric: String,
    pub error: ChronexError,
}

/// Outcome of a translation pass.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Metrics that registered at least one new family during this pass.
    pub created: Vec<(MetricKind, String)>,
    /// Metrics written successfully.
    pub updated: usize,
    pub malformed: Vec<MetricIssue>,
    /// Upstream metrics version, if reported.
    pub version: Option<String>,
}

/// Translates snapshots into the shared registry.
pub struct Translator {
    mapper: Mapper,
}

impl Translator {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            mapper: Mapper::new(registry),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.mapper.registry()
    }

    /// Translate one snapshot. Fails only when the snapshot is an upstream
    /// error report, in which case the registry is left untouched.
    pub fn translate(&self, snapshot: &Snapshot) -> Result<ScrapeReport> {
        let root = snapshot.root();

        if let Some(message) = root.get("message") {
            let message = match message.as_str() {
                Ok(s) => s.to_string(),
                Err(_) => message.value().to_string(),
            };
            return Err(ChronexError::UpstreamFailure(message));
        }

        let mut report = ScrapeReport::default();
        for (key, node) in root.children() {
            if key == "version" {
                self.translate_version(node, &mut report);
                continue;
            }
            let Some(kind) = MetricKind::from_group(key) else {
                continue;
            };

            for (metric, record) in node.children() {
                let (created, written) = self.translate_metric(kind, metric, record);
                if created {
                    report.created.push((kind, metric.to_string()));
                }
                match written {
                    Ok(()) => report.updated += 1,
                    Err(error) => report.malformed.push(MetricIssue {
                        kind: Some(kind),
                        metric: metric.to_string(),
                        error,
                    }),
                }
            }
        }
        Ok(report)
    }

    fn translate_version(&self, node: Node<'_>, report: &mut ScrapeReport) {
        let written = node.as_str().map_err(|e| malformed("version", e)).and_then(|version| {
            let (gauge, _) = self.registry().gauges().fetch(
                VERSION_METRIC,
                "Upstream metrics version",
                &[VERSION_LABEL],
            );
            gauge.set(&[(VERSION_LABEL, version)], 1.0)?;
            Ok(version)
        });

        match written {
            Ok(version) => report.version = Some(version.to_string()),
            Err(error) => report.malformed.push(MetricIssue {
                kind: None,
                metric: "version".to_string(),
                error,
            }),
        }
    }

    /// Returns whether a new family was registered for this metric, and
    /// whether its values were written. A rejected metric writes nothing.
    fn translate_metric(&self, kind: MetricKind, metric: &str, record: Node<'_>) -> (bool, Result<()>) {
        let (units, primary) = match required_fields(kind, metric, record) {
            Ok(fields) => fields,
            Err(e) => return (false, Err(e)),
        };

        let resolved = self.mapper.resolve(kind, metric, units);
        let written = resolved
            .check_schema()
            .and_then(|()| write_metric(record, &resolved, primary));
        (resolved.created, written)
    }
}

/// Units (meters, timers) and the primary value (`value` or `count`).
fn required_fields<'a>(
    kind: MetricKind,
    metric: &str,
    record: Node<'a>,
) -> Result<(Option<&'a str>, f64)> {
    let fail = |e: FieldError| malformed(metric, e);

    let units = match kind {
        MetricKind::Meter => Some(record.string("units").map_err(fail)?),
        MetricKind::Timer => Some(record.string("rate_units").map_err(fail)?),
        _ => None,
    };
    let primary = match kind {
        MetricKind::Gauge => record.number("value").map_err(fail)?,
        _ => record.number("count").map_err(fail)?,
    };
    Ok((units, primary))
}

fn write_metric(record: Node<'_>, resolved: &Resolved, primary: f64) -> Result<()> {
    let base = resolved.label_pairs();

    match &resolved.handles {
        Handles::Counter(counter) => counter.set(&base, primary)?,
        Handles::Gauge(gauge) => gauge.set(&base, primary)?,
        Handles::Meter(m) => {
            m.count.set(&base, primary)?;
            write_rates(record, &m.rates, resolved)?;
        }
        Handles::Histogram(h) => {
            h.count.set(&base, primary)?;
            write_distribution(record, &h.distribution, resolved)?;
        }
        Handles::Timer(t) => {
            t.count.set(&base, primary)?;
            write_rates(record, &t.rates, resolved)?;
            write_distribution(record, &t.distribution, resolved)?;
        }
    }
    Ok(())
}

fn malformed(metric: &str, e: FieldError) -> ChronexError {
    ChronexError::MalformedMetric {
        metric: metric.to_string(),
        reason: e.to_string(),
    }
}

fn write_rates(record: Node<'_>, rates: &GaugeVec, resolved: &Resolved) -> Result<()> {
    for (field, node) in record.children() {
        if !field.ends_with("_rate") {
            continue;
        }
        let Ok(value) = node.as_f64() else { continue };
        let rate = rename_rate(field);
        rates.set(&resolved.label_pairs_with(RATE_LABEL, &rate), value)?;
    }
    Ok(())
}

fn write_distribution(record: Node<'_>, d: &Distribution, resolved: &Resolved) -> Result<()> {
    let base = resolved.label_pairs();
    for (field, node) in record.children() {
        let Ok(value) = node.as_f64() else { continue };

        if let Some(percentile) = percentile_label(field) {
            d.percentiles
                .set(&resolved.label_pairs_with(PERCENTILE_LABEL, &percentile), value)?;
            continue;
        }
        match field {
            "min" => d.min.set(&base, value)?,
            "max" => d.max.set(&base, value)?,
            "mean" => d.mean.set(&base, value)?,
            "stddev" => d.stddev.set(&base, value)?,
            _ => {}
        }
    }
    Ok(())
}
