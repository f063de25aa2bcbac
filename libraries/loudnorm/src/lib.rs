//! Real-time loudness normalization for mono 16-bit PCM streams
//!
//! This crate provides:
//! - EBU R128 loudness metering (momentary, short-term, integrated, range)
//! - A conservative per-block gain decision from the windowed readings
//! - Gaussian smoothing of the gain trajectory over a fixed history
//! - In-place gain application with saturation at the 16-bit bounds
//!
//! # Architecture
//!
//! ```text
//! Per block (strictly causal, block-at-a-time):
//! ┌────────────┐     ┌───────────────┐     ┌───────────────┐
//! │ PCM Block  │ ──► │ LoudnessMeter │ ──► │ Gain Decision │
//! └────────────┘     └───────────────┘     └───────────────┘
//!                                                  │
//!                                                  ▼
//! ┌────────────┐     ┌───────────────┐     ┌───────────────┐
//! │ PCM Block  │ ◄── │ Gain Apply    │ ◄── │ GainHistory + │
//! │ (in place) │     │ (saturating)  │     │ Smoothing     │
//! └────────────┘     └───────────────┘     └───────────────┘
//! ```
//!
//! The first [`HISTORY_LEN`] blocks of a stream are a warm-up period during
//! which raw gain decisions are applied directly; once the history fills,
//! every applied gain is the kernel-filtered blend of recent decisions, so
//! the gain trajectory stays continuous.
//!
//! # Example
//!
//! ```ignore
//! use loudnorm::{LoudnessNormalizer, NormalizerConfig};
//!
//! let config = NormalizerConfig {
//!     target_loudness: -23.0,
//!     ..NormalizerConfig::default()
//! };
//! let mut normalizer = LoudnessNormalizer::new(config)?;
//!
//! // blocks is an iterator of &mut [i16] at 48 kHz, mono
//! for block in blocks {
//!     normalizer.process_block(block)?;
//! }
//! ```

#![forbid(unsafe_code)]

mod error;
mod history;
mod kernel;
mod meter;
mod normalizer;

pub use error::{LoudnormError, Result};
pub use history::{GainHistory, HISTORY_LEN};
pub use kernel::{GaussianKernel, KERNEL_LEN, KERNEL_SIGMA};
pub use meter::{LoudnessMeter, LoudnessReading};
pub use normalizer::{
    apply_gain, LoudnessNormalizer, NormalizerConfig, CHANNELS, EBU_R128_REFERENCE_LUFS,
    SAMPLE_RATE,
};
