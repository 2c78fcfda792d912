//! Scrape-on-collect exporter.
//!
//! Every collection fetches one snapshot, translates it into the shared
//! registry, and renders everything the registry has ever seen together with
//! the exporter's own scrape metrics. A failed scrape still renders the last
//! known values.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use chronex_core::error::{ChronexError, Result};
use chronex_core::{Registry, ScrapeReport, Snapshot, Translator};

use crate::obs::exposition;
use crate::obs::self_metrics::ExporterMetrics;
use crate::scraper::Scraper;

pub struct Exporter {
    scraper: Arc<dyn Scraper>,
    translator: Translator,
    metrics: ExporterMetrics,
    /// Serialises scrapes; collection of the registry itself is lock-free.
    scrape_lock: Mutex<()>,
}

impl Exporter {
    pub fn new(scraper: Arc<dyn Scraper>, namespace: &str) -> Self {
        Self {
            scraper,
            translator: Translator::new(Arc::new(Registry::new())),
            metrics: ExporterMetrics::new(namespace),
            scrape_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.translator.registry()
    }

    /// Scrape once and render the exposition body.
    pub async fn collect(&self) -> String {
        {
            let _guard = self.scrape_lock.lock().await;
            self.metrics.scrape_started();
            let started = Instant::now();

            let result = self.scrape().await;
            self.metrics.scrape_finished(started.elapsed(), result.is_err());

            match result {
                Ok(report) => log_report(&report),
                Err(ChronexError::UpstreamFailure(message)) => {
                    tracing::error!(%message, "upstream reported failure");
                }
                Err(e) => {
                    tracing::debug!(error = %e, code = e.code().as_str(), "problem scraping upstream");
                }
            }
        }
        self.render()
    }

    /// Render without scraping.
    pub fn render(&self) -> String {
        let mut families = self.registry().collect();
        families.extend(self.metrics.collect());
        exposition::encode(&families)
    }

    async fn scrape(&self) -> Result<ScrapeReport> {
        let body = self.scraper.scrape().await?;
        let snapshot = Snapshot::parse(&body)?;
        self.translator.translate(&snapshot)
    }
}

fn log_report(report: &ScrapeReport) {
    for (kind, metric) in &report.created {
        tracing::info!(kind = kind.as_str(), %metric, "registered metric");
    }
    for issue in &report.malformed {
        tracing::debug!(
            kind = issue.kind.map(|k| k.as_str()).unwrap_or("-"),
            metric = %issue.metric,
            error = %issue.error,
            "skipped malformed metric"
        );
    }
    tracing::debug!(
        updated = report.updated,
        malformed = report.malformed.len(),
        "scrape translated"
    );
}
