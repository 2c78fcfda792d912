//! Shared error type across chronex crates.

use thiserror::Error;

/// Stable error codes (used in log fields and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The snapshot is an upstream error report.
    UpstreamFailure,
    /// A single metric record is missing a field or has the wrong type.
    MalformedMetric,
    /// Label keys do not match the registered schema.
    LabelMismatch,
    /// The snapshot document itself could not be decoded.
    BadSnapshot,
    /// Invalid configuration.
    BadConfig,
    /// The upstream service could not be reached.
    UpstreamUnreachable,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UpstreamFailure => "UPSTREAM_FAILURE",
            ErrorCode::MalformedMetric => "MALFORMED_METRIC",
            ErrorCode::LabelMismatch => "LABEL_MISMATCH",
            ErrorCode::BadSnapshot => "BAD_SNAPSHOT",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UpstreamUnreachable => "UPSTREAM_UNREACHABLE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ChronexError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum ChronexError {
    #[error("upstream reported failure: {0}")]
    UpstreamFailure(String),
    #[error("malformed metric {metric}: {reason}")]
    MalformedMetric { metric: String, reason: String },
    #[error("label mismatch for {name}: registered {expected:?}, got {got:?}")]
    LabelMismatch {
        name: String,
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("bad snapshot: {0}")]
    BadSnapshot(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("upstream unreachable: {0}")]
    Upstream(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ChronexError {
    /// Map to a stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ChronexError::UpstreamFailure(_) => ErrorCode::UpstreamFailure,
            ChronexError::MalformedMetric { .. } => ErrorCode::MalformedMetric,
            ChronexError::LabelMismatch { .. } => ErrorCode::LabelMismatch,
            ChronexError::BadSnapshot(_) => ErrorCode::BadSnapshot,
            ChronexError::BadConfig(_) => ErrorCode::BadConfig,
            ChronexError::Upstream(_) => ErrorCode::UpstreamUnreachable,
            ChronexError::Internal(_) => ErrorCode::Internal,
        }
    }
}
