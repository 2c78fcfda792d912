//! Naming rule tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chronex_core::naming::{canonicalize, percentile_label, rename_rate, PERCENTILE_FIELDS};

#[test]
fn canonicalize_symbols() {
    let cases = [
        ("Foo", "foo"),
        ("foo_bar", "foo_bar"),
        ("foo.bar", "foo_bar"),
        ("foo-bar", "foo_bar"),
        ("foo$bar", "foo_bar"),
        ("foo(bar)", "foo_bar"),
    ];
    for (source, expect) in cases {
        let (name, labels) = canonicalize(source);
        assert_eq!(name, expect, "source {source}");
        assert!(labels.is_empty(), "source {source}");
    }
}

#[test]
fn canonicalize_jobs_run() {
    let (name, labels) = canonicalize("jobs.run.foo.bar");
    assert_eq!(name, "jobs_run_foo");
    assert_eq!(labels.len(), 1);
    assert_eq!(labels.get("job").map(String::as_str), Some("bar"));
}

#[test]
fn canonicalize_jobs_run_keeps_hyphenated_job_id() {
    let (name, labels) = canonicalize("jobs.run.failure.nightly-report");
    assert_eq!(name, "jobs_run_failure");
    assert_eq!(labels.get("job").map(String::as_str), Some("nightly-report"));
}

#[test]
fn canonicalize_is_deterministic() {
    for raw in ["jobs.run.time.x-y", "A.B$C(d)", "", "..--", "plain"] {
        assert_eq!(canonicalize(raw), canonicalize(raw));
    }
}

#[test]
fn punctuation_only_collapses_to_empty() {
    let (name, labels) = canonicalize(".$-()");
    assert_eq!(name, "");
    assert!(labels.is_empty());
}

#[test]
fn rename_rates() {
    let cases = [
        ("mean_rate", "mean"),
        ("m1_rate", "1m"),
        ("m5_rate", "5m"),
        ("m15_rate", "15m"),
        ("foo", "foo"),
        ("m30_rate", "m30"),
    ];
    for (field, expect) in cases {
        assert_eq!(rename_rate(field), expect, "field {field}");
    }
}

#[test]
fn percentile_labels() {
    let expected = ["0.50", "0.75", "0.95", "0.98", "0.99", "0.999"];
    for (field, expect) in PERCENTILE_FIELDS.iter().zip(expected) {
        assert_eq!(percentile_label(field).as_deref(), Some(expect));
    }
    assert_eq!(percentile_label("p42"), None);
    assert_eq!(percentile_label("mean"), None);
}
