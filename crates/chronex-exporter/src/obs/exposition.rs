//! Prometheus text exposition format (0.0.4).

use std::collections::HashSet;
use std::fmt::Write;

use chronex_core::registry::MetricFamily;

/// Content type of the rendered body.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// Render families in order. Families without series or without a name are
/// skipped. A name may appear only once per body, so when a counter and a
/// gauge share one, the first family rendered wins.
pub fn encode(families: &[MetricFamily]) -> String {
    let mut out = String::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for family in families.iter().filter(|f| !f.series.is_empty()) {
        if family.name.is_empty() {
            tracing::debug!(help = %family.help, "skipping family with empty name");
            continue;
        }
        if !seen.insert(family.name.as_str()) {
            tracing::warn!(
                name = %family.name,
                dropped_type = family.metric_type.as_str(),
                "family name already rendered with another type; dropping"
            );
            continue;
        }

        let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(&family.help));
        let _ = writeln!(out, "# TYPE {} {}", family.name, family.metric_type.as_str());

        for sample in &family.series {
            let label_str = family
                .label_keys
                .iter()
                .zip(&sample.label_values)
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>()
                .join(",");
            if label_str.is_empty() {
                let _ = writeln!(out, "{} {}", family.name, format_value(sample.value));
            } else {
                let _ = writeln!(
                    out,
                    "{}{{{}}} {}",
                    family.name,
                    label_str,
                    format_value(sample.value)
                );
            }
        }
    }
    out
}
