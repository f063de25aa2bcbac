//! Error types for loudness normalization

use thiserror::Error;

/// Result type for loudness normalization operations
pub type Result<T> = std::result::Result<T, LoudnormError>;

/// Errors that can occur while measuring or normalizing a stream
#[derive(Error, Debug)]
pub enum LoudnormError {
    /// Invalid sample rate
    #[error("Invalid sample rate: {0} Hz (must be between 8000 and 384000)")]
    InvalidSampleRate(u32),

    /// Invalid channel count
    #[error("Invalid channel count: {0} (must be 1-8)")]
    InvalidChannelCount(u32),

    /// EBU R128 measurement error
    #[error("Loudness measurement failed: {0}")]
    Meter(String),
}

impl From<ebur128::Error> for LoudnormError {
    fn from(err: ebur128::Error) -> Self {
        Self::Meter(format!("{:?}", err))
    }
}
