//! K-weighting: the pre-filter + RLB cascade specified by ITU-R BS.1770-4.
//!
//! Coefficients are hard-coded per supported rate rather than derived at
//! runtime from the analog prototype, matching the reference tables
//! published alongside the standard (and cross-checked against libebur128's
//! widely-reused constants).

use sonora_core::{MeasurementRate, SonoraError, SonoraResult};

use crate::biquad::{Biquad, BiquadCoeffs};

struct RateCoeffs {
    pre_b: [f64; 3],
    pre_a: [f64; 3],
    rlb_b: [f64; 3],
    rlb_a: [f64; 3],
}

const HZ_48000: RateCoeffs = RateCoeffs {
    pre_b: [1.53512485958697, -2.69169618940638, 1.19839281085285],
    pre_a: [1.0, -1.69065929318241, 0.73248077421585],
    rlb_b: [1.0, -2.0, 1.0],
    rlb_a: [1.0, -1.99004745483398, 0.99007225036621],
};

const HZ_44100: RateCoeffs = RateCoeffs {
    pre_b: [1.5308412300498355, -2.6509799951536985, 1.1690790799210682],
    pre_a: [1.0, -1.6636551132560204, 0.7125954280732254],
    rlb_b: [1.0, -2.0, 1.0],
    rlb_a: [1.0, -1.9891696736297957, 0.9891990357870394],
};

fn coeffs_for(rate: MeasurementRate) -> &'static RateCoeffs {
    match rate {
        MeasurementRate::Hz48000 => &HZ_48000,
        MeasurementRate::Hz44100 => &HZ_44100,
    }
}

/// A fresh (zero-initial-state) two-stage K-weighting cascade for one channel.
pub struct KWeightingFilter {
    pre: Biquad,
    rlb: Biquad,
}

impl KWeightingFilter {
    pub fn new(rate: MeasurementRate) -> Self {
        let c = coeffs_for(rate);
        let pre = BiquadCoeffs::from_raw(
            c.pre_b[0], c.pre_b[1], c.pre_b[2], c.pre_a[0], c.pre_a[1], c.pre_a[2],
        );
        let rlb = BiquadCoeffs::from_raw(
            c.rlb_b[0], c.rlb_b[1], c.rlb_b[2], c.rlb_a[0], c.rlb_a[1], c.rlb_a[2],
        );
        Self {
            pre: Biquad::new(pre),
            rlb: Biquad::new(rlb),
        }
    }

    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        self.rlb.process(self.pre.process(x))
    }
}

/// Applies K-weighting (pre-filter cascaded with RLB) to a channel buffer,
/// returning a new buffer of identical length. Filters start from zero state.
///
/// Fails with [`SonoraError::UnsupportedSampleRate`] at any rate other than
/// 44100 or 48000 Hz.
pub fn apply_k_weighting(samples: &[f32], rate: u32) -> SonoraResult<Vec<f64>> {
    let rate = MeasurementRate::from_hz(rate).ok_or_else(|| {
        log::warn!("K-weighting rejected unsupported sample rate: {rate} Hz");
        SonoraError::UnsupportedSampleRate(rate)
    })?;
    let mut filter = KWeightingFilter::new(rate);
    Ok(samples
        .iter()
        .map(|&x| filter.process(x as f64))
        .collect())
}

/// Per-channel loudness weights for the LUFS power sum.
///
/// 1 or 2 channels: unity. 6 channels (5.1: L, R, C, LFE, Ls, Rs): the LFE
/// channel (index 3) is excluded with weight 0, the surrounds get the
/// standard +1.5 dB (`10^(1.5/10)`) boost. Any other channel count: unity.
pub fn channel_weights(channel_count: usize) -> Vec<f64> {
    match channel_count {
        6 => vec![1.0, 1.0, 1.0, 0.0, 1.41253754462275, 1.41253754462275],
        n => vec![1.0; n],
    }
}
