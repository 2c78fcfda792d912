//! Top-level facade crate for chronex.
//!
//! Re-exports the translation engine and the exporter library so users can depend on a single crate.

pub mod core {
    pub use chronex_core::*;
}

pub mod exporter {
    pub use chronex_exporter::*;
}
