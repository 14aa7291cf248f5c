//! sonora-dsp: loudness and true-peak measurement, and the sample-domain
//! transforms built on top of them.
//!
//! ## Modules
//! - `biquad` - Direct-Form-I biquad filter section
//! - `k_weighting` - ITU-R BS.1770-4 K-weighting cascade
//! - `lufs` - integrated/momentary/short-term loudness (BS.1770-4 / EBU R128)
//! - `true_peak` - Kaiser-windowed polyphase-FIR true-peak detection (Annex 2)
//! - `transforms` - gain, fades, slice, reverse, concat, mix, speed,
//!   trim_silence, normalize_loudness

pub mod biquad;
pub mod k_weighting;
pub mod lufs;
pub mod transforms;
pub mod true_peak;

pub use biquad::{Biquad, BiquadCoeffs};
pub use k_weighting::{apply_k_weighting, channel_weights, KWeightingFilter};
pub use lufs::{measure_lufs, momentary_series, short_term};
pub use transforms::{
    concat, fade_in, fade_out, gain, mix, normalize_loudness, normalize_loudness_gain, reverse,
    slice, speed, trim_silence,
};
pub use true_peak::{true_peak, true_peak_multichannel};
