//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use chronex_core::error::{ChronexError, Result};

pub use schema::{ExporterConfig, ExporterSection, UpstreamSection};

/// Used when `CHRONEX_CONFIG` is not set.
pub const DEFAULT_PATH: &str = "chronex.yaml";

/// Load and validate a config file. A missing file yields the defaults.
pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            let cfg = ExporterConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
        Err(e) => Err(ChronexError::Internal(format!("read config failed: {e}"))),
    }
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| ChronexError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
