//! Exporter self-observation and Prometheus text exposition.
//!
//! The translated registry and the exporter's own scrape metrics are both
//! rendered through `exposition::encode`.

pub mod exposition;
pub mod self_metrics;
