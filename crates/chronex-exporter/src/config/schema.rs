use serde::Deserialize;
use chronex_core::error::{ChronexError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub upstream: UpstreamSection,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
            upstream: UpstreamSection::default(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ChronexError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.exporter.validate()?;
        self.upstream.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,

    /// Prefix of the exporter's own metrics.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            telemetry_path: default_telemetry_path(),
            namespace: default_namespace(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        if !self.telemetry_path.starts_with('/') || self.telemetry_path.len() < 2 {
            return Err(ChronexError::BadConfig(
                "exporter.telemetry_path must start with '/' and not be the root".into(),
            ));
        }
        if self.telemetry_path == "/healthz" {
            return Err(ChronexError::BadConfig(
                "exporter.telemetry_path must not shadow /healthz".into(),
            ));
        }
        let ns_ok = !self.namespace.is_empty()
            && self
                .namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !ns_ok {
            return Err(ChronexError::BadConfig(
                "exporter.namespace must be non-empty [a-zA-Z0-9_]".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    #[serde(default = "default_ping_path")]
    pub ping_path: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    #[serde(default = "default_insecure_skip_verify")]
    pub insecure_skip_verify: bool,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            metrics_path: default_metrics_path(),
            ping_path: default_ping_path(),
            timeout_ms: default_timeout_ms(),
            retry_interval_ms: default_retry_interval_ms(),
            insecure_skip_verify: default_insecure_skip_verify(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.uri.starts_with("http://") || self.uri.starts_with("https://")) {
            return Err(ChronexError::BadConfig(
                "upstream.uri must be an http(s) URL".into(),
            ));
        }
        if !self.metrics_path.starts_with('/') || !self.ping_path.starts_with('/') {
            return Err(ChronexError::BadConfig(
                "upstream.metrics_path and upstream.ping_path must start with '/'".into(),
            ));
        }
        if !(100..=120000).contains(&self.timeout_ms) {
            return Err(ChronexError::BadConfig(
                "upstream.timeout_ms must be between 100 and 120000".into(),
            ));
        }
        if !(100..=600000).contains(&self.retry_interval_ms) {
            return Err(ChronexError::BadConfig(
                "upstream.retry_interval_ms must be between 100 and 600000".into(),
            ));
        }
        Ok(())
    }

    /// `uri` joined with `path`, without doubling the slash.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.uri.trim_end_matches('/'), path)
    }
}

fn default_listen() -> String {
    "0.0.0.0:9044".into()
}
fn default_telemetry_path() -> String {
    "/metrics".into()
}
fn default_namespace() -> String {
    "chronos".into()
}
fn default_uri() -> String {
    "http://chronos.mesos:4400".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_ping_path() -> String {
    "/ping".into()
}
fn default_timeout_ms() -> u64 {
    10000
}
fn default_retry_interval_ms() -> u64 {
    10000
}
fn default_insecure_skip_verify() -> bool {
    true
}
