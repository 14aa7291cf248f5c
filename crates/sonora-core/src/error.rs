//! Error types shared across the sonora crates

use thiserror::Error;

/// Core error type for DSP/measurement/transform operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SonoraError {
    #[error("unsupported sample rate: {0} Hz (K-weighting is defined only at 44100/48000 Hz)")]
    UnsupportedSampleRate(u32),

    #[error("channel count mismatch: {a} vs {b}")]
    ChannelCountMismatch { a: usize, b: usize },

    #[error("channel buffers have differing lengths: {a} vs {b} (every channel in a track must be the same length)")]
    ChannelLengthMismatch { a: usize, b: usize },

    #[error("unsupported channel count: {0} (the track façade supports only mono or stereo)")]
    UnsupportedChannelCount(usize),

    #[error("sample rate mismatch: {a} vs {b}")]
    SampleRateMismatch { a: u32, b: u32 },

    #[error("channel index {index} out of range (track has {channel_count} channel(s))")]
    ChannelIndexOutOfRange { index: usize, channel_count: usize },

    #[error("invalid speed rate: {0} (must be > 0)")]
    InvalidSpeedRate(f64),

    #[error("invalid WAV data: {0}")]
    InvalidWav(String),

    #[error("decode failed: {0}")]
    DecodeFailed(String),
}

/// Result type alias for fallible sonora operations.
pub type SonoraResult<T> = Result<T, SonoraError>;
