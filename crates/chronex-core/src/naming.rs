//! Naming rules: raw Dropwizard metric names to Prometheus-safe names.
//!
//! All functions here are pure and total. Distinct raw names may collapse onto
//! the same canonical name (`foo.bar` and `foo-bar` both become `foo_bar`);
//! such metrics share one registry entry.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Dynamic labels extracted from a raw name. Ordered so label-key schemas are
/// deterministic.
pub type Labels = BTreeMap<String, String>;

/// Label key carrying the job id of `jobs.run.<group>.<job>` metrics.
pub const JOB_LABEL: &str = "job";

const SYMBOLS: [char; 5] = ['.', '$', '-', '(', ')'];

#[allow(clippy::expect_used)]
static JOBS_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"jobs\.run\.([0-9A-Za-z_]+)\.([0-9A-Za-z_-]+)")
        .expect("JOBS_RUN is a compile-time constant")
});

/// Canonicalize a raw metric name into `(name, labels)`.
///
/// `jobs.run.<group>.<job>` is rewritten to `jobs_run_<group>` with the job id
/// moved into a `job` label. Then `.`, `$`, `-`, `(`, `)` become `_`, trailing
/// underscores are trimmed, and the result is lowercased.
pub fn canonicalize(raw: &str) -> (String, Labels) {
    let mut labels = Labels::new();

    let name = match JOBS_RUN.captures(raw) {
        Some(caps) => {
            labels.insert(JOB_LABEL.to_string(), caps[2].to_string());
            format!("jobs_run_{}", &caps[1])
        }
        None => raw.to_string(),
    };

    let name = name.replace(&SYMBOLS[..], "_");
    (name.trim_end_matches('_').to_lowercase(), labels)
}

/// Rename a Dropwizard rate field to its `rate` label value.
pub fn rename_rate(field: &str) -> String {
    match field {
        "m1_rate" => "1m".to_string(),
        "m5_rate" => "5m".to_string(),
        "m15_rate" => "15m".to_string(),
        other => other.strip_suffix("_rate").unwrap_or(other).to_string(),
    }
}

/// Percentile fields reported by Dropwizard histograms and timers.
pub const PERCENTILE_FIELDS: [&str; 6] = ["p50", "p75", "p95", "p98", "p99", "p999"];

/// Map a percentile field (`p50`, `p999`) to its `percentile` label value
/// (`0.50`, `0.999`). Returns `None` for anything else.
pub fn percentile_label(field: &str) -> Option<String> {
    if !PERCENTILE_FIELDS.contains(&field) {
        return None;
    }
    field.strip_prefix('p').map(|digits| format!("0.{digits}"))
}
