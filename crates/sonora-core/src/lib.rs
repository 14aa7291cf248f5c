//! sonora-core: shared sample type, dB conversions, and error types.
//!
//! This crate provides the foundational types used across the sonora
//! audio-processing crates (`sonora-dsp`, `sonora-codec`, `sonora-track`).

mod error;
mod sample;

pub use error::*;
pub use sample::*;

/// Sample rates at which K-weighted loudness measurement is defined.
///
/// ITU-R BS.1770-4's K-weighting coefficients are only published for these
/// two rates; anything else is rejected with [`SonoraError::UnsupportedSampleRate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementRate {
    Hz44100,
    Hz48000,
}

impl MeasurementRate {
    /// Maps a raw sample rate in Hz to a supported measurement rate, if any.
    pub fn from_hz(rate: u32) -> Option<Self> {
        match rate {
            44_100 => Some(Self::Hz44100),
            48_000 => Some(Self::Hz48000),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Hz44100 => 44_100,
            Self::Hz48000 => 48_000,
        }
    }
}
