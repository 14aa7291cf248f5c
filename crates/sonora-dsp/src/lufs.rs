//! Integrated, momentary, and short-term loudness per ITU-R BS.1770-4 / EBU
//! R128: K-weighted 400 ms blocks at 75% overlap, dual absolute/relative
//! gating for the integrated figure.
//!
//! Block-power computation and gating mirror the structure of
//! `examples/other_examples/afe18157_flo-audio-flo__libflo-src-core-ebu_r128.rs.rs`
//! (whole-buffer, non-streaming) and the gating-pass split of
//! `examples/other_examples/275fe2dc_casterplay-BassAES67__BassAES67-bass_broadcast_processor-src-dsp-lufs_meter.rs.rs`.

use sonora_core::{MeasurementRate, SonoraError, SonoraResult};

use crate::k_weighting::{apply_k_weighting, channel_weights};

const ABSOLUTE_GATE_LUFS: f64 = -70.0;
const RELATIVE_GATE_LU: f64 = -10.0;

/// `-0.691 + 10*log10(power)`, the BS.1770 power-to-LUFS conversion.
#[inline]
fn power_to_lufs(power: f64) -> f64 {
    -0.691 + 10.0 * power.log10()
}

#[inline]
fn lufs_to_power(lufs: f64) -> f64 {
    10.0f64.powf((lufs + 0.691) / 10.0)
}

/// Splits K-weighted channels into overlapping 400 ms blocks and computes
/// each block's channel-weighted power sum.
///
/// `block_size = floor(0.4 * rate)`, hop = `floor(block_size * 0.25)`. Only
/// full blocks are emitted (`start + block_size <= N`).
fn block_powers(k_weighted: &[Vec<f64>], rate: u32) -> Vec<f64> {
    if k_weighted.is_empty() || k_weighted[0].is_empty() {
        return Vec::new();
    }

    let n = k_weighted[0].len();
    let block_size = (0.4 * rate as f64).floor() as usize;
    if block_size == 0 || n < block_size {
        return Vec::new();
    }
    let hop = (block_size as f64 * 0.25).floor() as usize;
    let hop = hop.max(1);
    let weights = channel_weights(k_weighted.len());

    let mut powers = Vec::new();
    let mut start = 0usize;
    while start + block_size <= n {
        let mut block_power = 0.0;
        for (ch, samples) in k_weighted.iter().enumerate() {
            let mut sum_sq = 0.0;
            for &s in &samples[start..start + block_size] {
                sum_sq += s * s;
            }
            let mean_square = sum_sq / block_size as f64;
            block_power += weights[ch] * mean_square;
        }
        powers.push(block_power);
        start += hop;
    }
    powers
}

/// Absolute-then-relative dual gating. Returns the gated mean power, or
/// `0.0` if every block is gated out.
fn apply_gating(block_power: &[f64]) -> f64 {
    let abs_threshold = lufs_to_power(ABSOLUTE_GATE_LUFS);
    let above_absolute: Vec<f64> = block_power
        .iter()
        .copied()
        .filter(|&p| p > abs_threshold)
        .collect();

    if above_absolute.is_empty() {
        return 0.0;
    }

    let m1 = above_absolute.iter().sum::<f64>() / above_absolute.len() as f64;
    let rel_threshold = lufs_to_power(power_to_lufs(m1) + RELATIVE_GATE_LU);

    let above_relative: Vec<f64> = above_absolute
        .into_iter()
        .filter(|&p| p >= rel_threshold)
        .collect();

    if above_relative.is_empty() {
        return 0.0;
    }

    above_relative.iter().sum::<f64>() / above_relative.len() as f64
}

/// Measures integrated loudness (LUFS) of a set of channel buffers.
///
/// Returns `-inf` if the channel set is empty, shorter than 400 ms, or
/// silent. Fails with [`SonoraError::UnsupportedSampleRate`] for any rate
/// other than 44100/48000 Hz.
pub fn measure_lufs(channels: &[Vec<f32>], rate: u32) -> SonoraResult<f64> {
    if channels.is_empty() {
        return Ok(f64::NEG_INFINITY);
    }
    // Validate the rate even if the gating short-circuits to -inf below, so
    // callers get UnsupportedSampleRate rather than a silent -inf.
    MeasurementRate::from_hz(rate).ok_or_else(|| {
        log::warn!("loudness measurement rejected unsupported sample rate: {rate} Hz");
        SonoraError::UnsupportedSampleRate(rate)
    })?;

    let k_weighted: Vec<Vec<f64>> = channels
        .iter()
        .map(|ch| apply_k_weighting(ch, rate))
        .collect::<SonoraResult<_>>()?;

    let powers = block_powers(&k_weighted, rate);
    if powers.is_empty() {
        return Ok(f64::NEG_INFINITY);
    }

    let gated = apply_gating(&powers);
    if gated == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }

    Ok(power_to_lufs(gated))
}

/// Momentary loudness: the LUFS of each individual 400 ms/100 ms-hop block,
/// ungated. One entry per block produced by [`measure_lufs`]'s
/// segmentation; `-inf` for any all-silent block.
pub fn momentary_series(channels: &[Vec<f32>], rate: u32) -> SonoraResult<Vec<f64>> {
    MeasurementRate::from_hz(rate).ok_or(SonoraError::UnsupportedSampleRate(rate))?;
    if channels.is_empty() {
        return Ok(Vec::new());
    }
    let k_weighted: Vec<Vec<f64>> = channels
        .iter()
        .map(|ch| apply_k_weighting(ch, rate))
        .collect::<SonoraResult<_>>()?;
    let powers = block_powers(&k_weighted, rate);
    Ok(powers
        .into_iter()
        .map(|p| if p > 0.0 { power_to_lufs(p) } else { f64::NEG_INFINITY })
        .collect())
}

/// Short-term loudness: the ungated average LUFS over the trailing 3 s
/// (30 blocks at the standard 100 ms hop) at every block boundary that has
/// at least 3 s of history; `-inf` until then.
pub fn short_term(channels: &[Vec<f32>], rate: u32) -> SonoraResult<Vec<f64>> {
    const SHORT_TERM_BLOCKS: usize = 30;
    let powers = {
        MeasurementRate::from_hz(rate).ok_or(SonoraError::UnsupportedSampleRate(rate))?;
        if channels.is_empty() {
            return Ok(Vec::new());
        }
        let k_weighted: Vec<Vec<f64>> = channels
            .iter()
            .map(|ch| apply_k_weighting(ch, rate))
            .collect::<SonoraResult<_>>()?;
        block_powers(&k_weighted, rate)
    };

    Ok(powers
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < SHORT_TERM_BLOCKS {
                f64::NEG_INFINITY
            } else {
                let window = &powers[i + 1 - SHORT_TERM_BLOCKS..=i];
                let mean = window.iter().sum::<f64>() / window.len() as f64;
                if mean > 0.0 {
                    power_to_lufs(mean)
                } else {
                    f64::NEG_INFINITY
                }
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, amplitude: f32, rate: u32, duration_secs: f64) -> Vec<f32> {
        let n = (rate as f64 * duration_secs) as usize;
        (0..n)
            .map(|i| (amplitude as f64 * (2.0 * PI * freq * i as f64 / rate as f64).sin()) as f32)
            .collect()
    }

    #[test]
    fn empty_input_is_neg_infinity() {
        assert_eq!(measure_lufs(&[], 48_000).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn silence_is_neg_infinity() {
        let ch = vec![0.0_f32; 48_000];
        assert_eq!(measure_lufs(&[ch], 48_000).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn shorter_than_400ms_is_neg_infinity() {
        let ch = vec![0.5_f32; 1000]; // ~20.8ms @ 48kHz
        assert_eq!(measure_lufs(&[ch], 48_000).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn unsupported_rate_errors() {
        assert!(matches!(
            measure_lufs(&[vec![0.0_f32; 48_000]], 22_050),
            Err(SonoraError::UnsupportedSampleRate(22_050))
        ));
    }

    #[test]
    fn full_scale_997hz_sine_measures_in_expected_band() {
        let ch = sine(997.0, 1.0, 48_000, 1.0);
        let lufs = measure_lufs(&[ch.clone(), ch], 48_000).unwrap();
        assert!(
            (-3.5..=-2.5).contains(&lufs),
            "expected LUFS in [-3.5, -2.5], got {lufs}"
        );
    }

    #[test]
    fn attenuated_997hz_sine_measures_in_expected_band() {
        let amplitude = 10f64.powf(-20.0 / 20.0) as f32;
        let ch = sine(997.0, amplitude, 48_000, 1.0);
        let lufs = measure_lufs(&[ch.clone(), ch], 48_000).unwrap();
        assert!(
            (-23.5..=-22.5).contains(&lufs),
            "expected LUFS in [-23.5, -22.5], got {lufs}"
        );
    }

    #[test]
    fn duplicating_mono_into_stereo_raises_loudness_by_3_01_lu() {
        let ch = sine(997.0, 0.2, 48_000, 1.0);
        let mono = measure_lufs(std::slice::from_ref(&ch), 48_000).unwrap();
        let stereo = measure_lufs(&[ch.clone(), ch], 48_000).unwrap();
        assert!(
            ((stereo - mono) - 10.0 * 2.0f64.log10()).abs() < 0.1,
            "mono={mono} stereo={stereo}"
        );
    }

    #[test]
    fn cross_rate_consistency() {
        let ch_44 = sine(997.0, 0.3, 44_100, 1.0);
        let ch_48 = sine(997.0, 0.3, 48_000, 1.0);
        let l44 = measure_lufs(&[ch_44.clone(), ch_44], 44_100).unwrap();
        let l48 = measure_lufs(&[ch_48.clone(), ch_48], 48_000).unwrap();
        assert!((l44 - l48).abs() < 0.5, "l44={l44} l48={l48}");
    }

    #[test]
    fn momentary_series_has_entry_per_block() {
        let ch = sine(997.0, 0.5, 48_000, 1.0);
        let series = momentary_series(&[ch], 48_000).unwrap();
        assert!(!series.is_empty());
        assert!(series.iter().all(|&l| l.is_finite() && l < 0.0));
    }

    #[test]
    fn short_term_is_neg_infinity_before_3_seconds() {
        let ch = sine(997.0, 0.5, 48_000, 1.0);
        let series = short_term(&[ch], 48_000).unwrap();
        assert!(series.iter().all(|&l| l == f64::NEG_INFINITY));
    }
}
