//! Shared application state for the exporter HTTP surface.

use std::sync::Arc;

use crate::config::ExporterConfig;
use crate::exporter::Exporter;
use crate::scraper::Scraper;

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<ExporterConfig>,
    exporter: Arc<Exporter>,
}

impl AppState {
    pub fn new(cfg: ExporterConfig, scraper: Arc<dyn Scraper>) -> Self {
        let exporter = Exporter::new(scraper, &cfg.exporter.namespace);
        Self {
            cfg: Arc::new(cfg),
            exporter: Arc::new(exporter),
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.cfg
    }

    pub fn exporter(&self) -> Arc<Exporter> {
        Arc::clone(&self.exporter)
    }
}
