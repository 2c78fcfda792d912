//! chronex core: translation of Dropwizard-style metric snapshots into a
//! dynamic, label-aware metrics registry.
//!
//! This crate owns naming rules, the typed registry, per-kind mapping, and the
//! snapshot translator. It carries no transport or runtime dependencies so the
//! exporter binary and tests can drive it directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! A malformed snapshot surfaces as `ChronexError`/`Result`, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod mapper;
pub mod naming;
pub mod registry;
pub mod snapshot;
pub mod translator;

/// Shared result type.
pub use error::{ChronexError, Result};
pub use mapper::{Mapper, MetricKind};
pub use registry::Registry;
pub use snapshot::Snapshot;
pub use translator::{ScrapeReport, Translator};
