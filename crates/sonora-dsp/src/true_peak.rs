//! True-peak detection per ITU-R BS.1770-4 Annex 2: 4x oversampling through
//! a Kaiser-windowed polyphase FIR, reporting the peak of the oversampled
//! signal rather than the sample-rate peak.
//!
//! Grounded on the Kaiser/sinc FIR true-peak routine in
//! `examples/other_examples/afe18157_flo-audio-flo__libflo-src-core-ebu_r128.rs.rs`
//! (`compute_true_peak`), generalized to the polyphase (no-interleaved-zero)
//! form so each output sample costs one dot product instead of one
//! multiply-heavy convolution per zero-stuffed slot.

use std::sync::OnceLock;

/// Oversampling factor (phases).
const L: usize = 4;
/// Taps per phase.
const M: usize = 12;
/// Prototype filter length (`L * M`).
const TAPS: usize = L * M;
/// Kaiser window shape parameter.
const BETA: f64 = 5.0;

/// Modified Bessel function of the first kind, order 0, via its power
/// series. Converges quickly for the beta values used in audio windowing;
/// capped at 20 terms with an early break once a term stops contributing.
fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    let half_x = x / 2.0;
    for k in 1..=20 {
        term *= (half_x / k as f64).powi(2);
        sum += term;
        if term < 1e-12 * sum {
            break;
        }
    }
    sum
}

/// Builds the `L`-phase polyphase FIR table for 4x oversampling.
///
/// The prototype is a windowed-sinc low-pass at the oversampled Nyquist
/// (`pi / L`), Kaiser-windowed with `BETA = 5.0`. The sinc and the window
/// are centered differently on purpose: the sinc centers at `S`, the
/// nearest multiple of `L` to the true midpoint, so phase 0 reproduces
/// integer sample positions exactly (every other tap in phase 0 lands on
/// a sinc zero-crossing); the window centers at the true midpoint `W` so
/// it stays symmetric. Phase `p`'s `M` taps are every `L`-th prototype
/// coefficient starting at offset `p`, which is exactly the decomposition
/// a zero-stuffed-then-filtered upsampler reduces to once you discard the
/// structural zeros. Each phase is normalized so its taps sum to `1.0`
/// (unity DC gain) since polyphase decomposition can leave per-phase gain
/// imbalance at odd tap counts.
fn build_polyphase_table() -> Vec<[f64; M]> {
    let mid = (TAPS - 1) as f64 / 2.0;
    let sinc_center = (mid / L as f64).round() * L as f64;
    let window_center = mid;
    let mut prototype = [0.0_f64; TAPS];

    let i0_beta = bessel_i0(BETA);
    for (n, slot) in prototype.iter_mut().enumerate() {
        let m = n as f64 - sinc_center;
        let sinc = if m.abs() < 1e-10 {
            1.0
        } else {
            (std::f64::consts::PI * m / L as f64).sin() / (std::f64::consts::PI * m / L as f64)
        };
        let ratio = (n as f64 - window_center) / window_center;
        let window_arg = BETA * (1.0 - ratio * ratio).max(0.0).sqrt();
        let window = bessel_i0(window_arg) / i0_beta;
        *slot = sinc * window;
    }

    let mut phases = vec![[0.0_f64; M]; L];
    for (n, &coeff) in prototype.iter().enumerate() {
        let phase = n % L;
        let tap = n / L;
        phases[phase][tap] = coeff;
    }

    for phase in phases.iter_mut() {
        let sum: f64 = phase.iter().sum();
        if sum.abs() > 1e-12 {
            for c in phase.iter_mut() {
                *c /= sum;
            }
        }
    }

    phases
}

fn polyphase_table() -> &'static Vec<[f64; M]> {
    static TABLE: OnceLock<Vec<[f64; M]>> = OnceLock::new();
    TABLE.get_or_init(build_polyphase_table)
}

/// Computes the 4x-oversampled true peak (absolute value, linear scale) of
/// a single channel.
///
/// The first `M - 1` samples lack enough history for a full polyphase
/// convolution; for those positions only the raw sample magnitude is
/// considered, matching the boundary-skip behavior of whole-buffer
/// reference implementations rather than zero-padding (which would bias
/// the early oversampled values toward zero).
pub fn true_peak(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let table = polyphase_table();
    let mut peak = 0.0_f64;

    for &s in samples {
        let mag = (s as f64).abs();
        if mag > peak {
            peak = mag;
        }
    }

    for center in (M - 1)..samples.len() {
        let window = &samples[center + 1 - M..=center];
        for phase_taps in table.iter() {
            let mut acc = 0.0_f64;
            for (tap_index, &coeff) in phase_taps.iter().enumerate() {
                // window is oldest..newest; tap 0 pairs with the newest sample.
                let sample = window[M - 1 - tap_index] as f64;
                acc += coeff * sample;
            }
            let mag = acc.abs();
            if mag > peak {
                peak = mag;
            }
        }
    }

    peak
}

/// Computes the true peak across a set of channels (e.g. a stereo pair),
/// as the maximum of each channel's independent true peak.
pub fn true_peak_multichannel(channels: &[Vec<f32>]) -> f64 {
    channels
        .iter()
        .map(|ch| true_peak(ch))
        .fold(0.0_f64, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(true_peak(&[]), 0.0);
    }

    #[test]
    fn silence_is_zero() {
        assert_eq!(true_peak(&[0.0; 100]), 0.0);
    }

    #[test]
    fn single_full_scale_impulse_reports_at_least_sample_peak() {
        let mut samples = vec![0.0_f32; 64];
        samples[32] = 1.0;
        let peak = true_peak(&samples);
        assert!(peak >= 1.0, "expected true peak >= 1.0, got {peak}");
    }

    #[test]
    fn adjacent_near_full_scale_samples_overshoot_sample_peak() {
        let mut samples = vec![0.0_f32; 64];
        samples[31] = 0.9;
        samples[32] = -0.9;
        samples[33] = 0.9;
        let peak = true_peak(&samples);
        assert!(
            peak > 0.9,
            "expected inter-sample overshoot above 0.9, got {peak}"
        );
    }

    #[test]
    fn dc_signal_true_peak_matches_dc_level() {
        let samples = vec![0.5_f32; 256];
        let peak = true_peak(&samples);
        assert!(
            (peak - 0.5).abs() < 0.02,
            "expected true peak near 0.5 for DC input, got {peak}"
        );
    }

    #[test]
    fn multichannel_takes_max_across_channels() {
        let quiet = vec![0.1_f32; 64];
        let mut loud = vec![0.0_f32; 64];
        loud[10] = 0.8;
        let peak = true_peak_multichannel(&[quiet, loud]);
        assert!(peak >= 0.8);
    }

    #[test]
    fn polyphase_table_has_unity_dc_gain_per_phase() {
        let table = polyphase_table();
        for phase in table.iter() {
            let sum: f64 = phase.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "phase sum {sum} != 1.0");
        }
    }
}
