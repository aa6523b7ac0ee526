//! report-core
//!
//! Core library for assembling report chapters: statistics tables, analysis
//! prompts for an external language model, and tracked output placeholders
//! that are filled out of process.
//!
//! The pipeline is strictly linear:
//! loader → renderer → placeholder tracker → exporter.
//! All substantive logic lives here so it is fully testable and reusable
//! from multiple frontends.

pub mod config;
pub mod error;
pub mod export;
pub mod files;
pub mod loader;
pub mod model;
pub mod render;
pub mod skeleton;
pub mod tracker;

pub use error::{ReportError, ReportResult};

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
