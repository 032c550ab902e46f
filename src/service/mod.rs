//! Service layer module.
//!
//! Contains the Luhn arithmetic, number synthesis, the export engine and
//! estimation.

pub mod estimate;
pub mod export;
pub mod luhn;
pub mod synthesizer;

pub use export::{ExportCoordinator, ExportOptions, ExportSession};
pub use synthesizer::Synthesizer;
