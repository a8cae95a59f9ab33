//! Event compression engine
//!
//! Converts the firehose of raw input events into a compact, semantically
//! labeled stream: press/release pairing, typed-string merging, and mouse
//! gesture condensation, all governed by configurable timing windows.

pub mod buffers;
pub mod compressor;
pub mod config;

pub use compressor::{CompressorReport, EventCompressor};
pub use config::CompressorConfig;

/// Durations are reported with the capture pipeline's five-decimal precision.
pub(crate) fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}
