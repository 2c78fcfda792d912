//! chronex exporter library entry.
//!
//! Wires configuration, the upstream scraper, the translation engine from
//! `chronex-core`, and the HTTP surface. Consumed by the binary (`main.rs`)
//! and by integration tests.

pub mod app_state;
pub mod config;
pub mod exporter;
pub mod obs;
pub mod ops;
pub mod router;
pub mod scraper;
