use std::time::Duration;

use chronex_core::registry::{CounterVec, GaugeVec, MetricFamily};

/// The exporter's own scrape health, kept apart from translated metrics so an
/// upstream metric can never shadow it.
pub struct ExporterMetrics {
    duration: GaugeVec,
    scrape_error: GaugeVec,
    scrapes_total: CounterVec,
    errors_total: CounterVec,
}

impl ExporterMetrics {
    pub fn new(namespace: &str) -> Self {
        let name = |suffix: &str| format!("{namespace}_exporter_{suffix}");
        Self {
            duration: GaugeVec::new(
                &name("last_scrape_duration_seconds"),
                "Duration of the last scrape of upstream metrics.",
                &[],
            ),
            scrape_error: GaugeVec::new(
                &name("last_scrape_error"),
                "Whether the last scrape of upstream metrics resulted in an error (1 for error, 0 for success).",
                &[],
            ),
            scrapes_total: CounterVec::new(
                &name("scrapes_total"),
                "Total number of times upstream was scraped for metrics.",
                &[],
            ),
            errors_total: CounterVec::new(
                &name("errors_total"),
                "Total number of times the exporter experienced errors collecting upstream metrics.",
                &[],
            ),
        }
    }

    pub fn scrape_started(&self) {
        let _ = self.scrapes_total.inc(&[]);
    }

    pub fn scrape_finished(&self, elapsed: Duration, failed: bool) {
        let _ = self.duration.set(&[], elapsed.as_secs_f64());
        if failed {
            let _ = self.errors_total.inc(&[]);
            let _ = self.scrape_error.set(&[], 1.0);
        } else {
            let _ = self.scrape_error.set(&[], 0.0);
        }
    }

    pub fn collect(&self) -> Vec<MetricFamily> {
        vec![
            self.duration.collect(),
            self.scrapes_total.collect(),
            self.errors_total.collect(),
            self.scrape_error.collect(),
        ]
    }
}
