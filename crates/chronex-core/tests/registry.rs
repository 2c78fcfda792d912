//! Registry fetch-or-create and series tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Barrier};
use std::thread;

use chronex_core::error::ErrorCode;
use chronex_core::registry::{MetricType, Registry};

#[test]
fn fetch_is_idempotent() {
    let registry = Registry::new();
    let (first, created) = registry.counters().fetch("x", "help", &["a"]);
    assert!(created);
    let (second, created) = registry.counters().fetch("x", "other help", &["a"]);
    assert!(!created);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.help(), "help");
    assert_eq!(registry.counters().len(), 1);
}

#[test]
fn first_schema_wins() {
    let registry = Registry::new();
    let (first, _) = registry.gauges().fetch("x", "help", &["a"]);
    let (again, created) = registry.gauges().fetch("x", "help", &["a", "b"]);
    assert!(!created);
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(again.label_keys(), ["a".to_string()]);

    // Writes must still use the registered schema.
    let err = again.set(&[("a", "1"), ("b", "2")], 1.0).expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::LabelMismatch);
    again.set(&[("a", "1")], 1.0).unwrap();
    assert_eq!(again.get(&[("a", "1")]), Some(1.0));
}

#[test]
fn drift_is_recorded_once_per_name() {
    let registry = Registry::new();
    registry.gauges().fetch("x", "help", &["a"]);
    registry.gauges().fetch("x", "help", &["a"]);
    registry.gauges().fetch("x", "help", &["a"]);
    assert!(registry.gauges().drifted().is_empty());

    for _ in 0..3 {
        registry.gauges().fetch("x", "help", &["b"]);
    }
    registry.gauges().fetch("y", "help", &[]);
    registry.gauges().fetch("y", "help", &["c"]);
    assert_eq!(registry.gauges().drifted(), ["x".to_string(), "y".to_string()]);
}

#[test]
fn check_schema_ignores_key_order() {
    let registry = Registry::new();
    let (g, _) = registry.gauges().fetch("x", "help", &["a", "b"]);
    assert!(g.check_schema(&["b", "a"]).is_ok());
    assert_eq!(g.check_schema(&["a"]).unwrap_err().code(), ErrorCode::LabelMismatch);
}

#[test]
fn counters_and_gauges_live_apart() {
    let registry = Registry::new();
    let (_, c) = registry.counters().fetch("shared", "counter", &[]);
    let (_, g) = registry.gauges().fetch("shared", "gauge", &[]);
    assert!(c && g);

    let families = registry.collect();
    assert_eq!(families.len(), 2);
    assert_eq!(families[0].metric_type, MetricType::Counter);
    assert_eq!(families[1].metric_type, MetricType::Gauge);
}

#[test]
fn label_order_does_not_matter() {
    let registry = Registry::new();
    let (g, _) = registry.gauges().fetch("x", "help", &["a", "b"]);
    g.set(&[("b", "2"), ("a", "1")], 5.0).unwrap();
    g.set(&[("a", "1"), ("b", "2")], 7.0).unwrap();
    assert_eq!(g.series_count(), 1);
    assert_eq!(g.get(&[("a", "1"), ("b", "2")]), Some(7.0));

    let family = g.collect();
    assert_eq!(family.series[0].label_values, ["1".to_string(), "2".to_string()]);
}

#[test]
fn unknown_label_key_is_rejected() {
    let registry = Registry::new();
    let (g, _) = registry.gauges().fetch("x", "help", &["a"]);
    let err = g.set(&[("z", "1")], 1.0).expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::LabelMismatch);
    assert_eq!(g.series_count(), 0);
}

#[test]
fn counter_inc() {
    let registry = Registry::new();
    let (c, _) = registry.counters().fetch("scrapes_total", "help", &[]);
    c.inc(&[]).unwrap();
    c.inc_by(&[], 2.5).unwrap();
    c.inc_by(&[], -10.0).unwrap();
    assert_eq!(c.get(&[]), Some(3.5));
}

#[test]
fn concurrent_fetch_has_one_winner() {
    let registry = Arc::new(Registry::new());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let (vec, created) = registry.counters().fetch("race", "help", &[]);
                (vec, created)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1);
    let first = &results[0].0;
    assert!(results.iter().all(|(vec, _)| Arc::ptr_eq(vec, first)));
    assert_eq!(registry.counters().len(), 1);
}

#[test]
fn collect_is_sorted() {
    let registry = Registry::new();
    for name in ["b", "c", "a"] {
        let (g, _) = registry.gauges().fetch(name, "help", &["k"]);
        g.set(&[("k", "2")], 2.0).unwrap();
        g.set(&[("k", "1")], 1.0).unwrap();
    }
    let families = registry.collect();
    let names: Vec<_> = families.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
    let values: Vec<_> = families[0].series.iter().map(|s| s.value).collect();
    assert_eq!(values, [1.0, 2.0]);
}
