//! Loudness-preserving sample-domain transforms: gain, fades, slicing,
//! reversal, concatenation, mixing, speed change, silence trimming, and
//! loudness normalization.
//!
//! These operate on plain per-channel `Vec<f32>` buffers (the `Track`
//! façade in `sonora-track` owns the higher-level, channel-count/rate
//! bookkeeping and wraps these as chainable methods). Every function
//! returns a new buffer; none mutate their inputs in place, matching the
//! crate's immutable-value convention.

use sonora_core::{db_to_linear, SonoraError, SonoraResult};

use crate::lufs::measure_lufs;
use crate::true_peak::true_peak_multichannel;

/// Multiplies every sample by `db_to_linear(db)`. No clipping.
pub fn gain(samples: &[f32], db: f64) -> Vec<f32> {
    let factor = db_to_linear(db) as f32;
    samples.iter().map(|&x| x * factor).collect()
}

/// Ramps the first `floor(ms * rate / 1000)` samples linearly from 0 to 1.
/// If the ramp region exceeds the buffer length, the whole buffer is ramped.
pub fn fade_in(samples: &[f32], ms: f64, rate: u32) -> Vec<f32> {
    let ramp_len = fade_len(samples.len(), ms, rate);
    let mut out = samples.to_vec();
    for (i, sample) in out.iter_mut().enumerate().take(ramp_len) {
        let f = if ramp_len <= 1 {
            1.0
        } else {
            i as f64 / (ramp_len - 1) as f64
        };
        *sample *= f as f32;
    }
    out
}

/// Ramps the last `floor(ms * rate / 1000)` samples linearly from 1 to 0.
/// If the ramp region exceeds the buffer length, the whole buffer is ramped.
pub fn fade_out(samples: &[f32], ms: f64, rate: u32) -> Vec<f32> {
    let ramp_len = fade_len(samples.len(), ms, rate);
    let mut out = samples.to_vec();
    let start = out.len() - ramp_len;
    for (offset, sample) in out[start..].iter_mut().enumerate() {
        let f = if ramp_len <= 1 {
            0.0
        } else {
            1.0 - offset as f64 / (ramp_len - 1) as f64
        };
        *sample *= f as f32;
    }
    out
}

fn fade_len(buffer_len: usize, ms: f64, rate: u32) -> usize {
    let requested = ((ms * rate as f64) / 1000.0).floor() as usize;
    requested.min(buffer_len)
}

/// Extracts samples at indices `[floor(start_ms*rate/1000), floor(end_ms*rate/1000))`.
/// `end_ms = None` means end-of-buffer. Out-of-range bounds clamp.
pub fn slice(samples: &[f32], start_ms: f64, end_ms: Option<f64>, rate: u32) -> Vec<f32> {
    let len = samples.len();
    let start = ms_to_sample(start_ms, rate).min(len);
    let end = match end_ms {
        Some(ms) => ms_to_sample(ms, rate).min(len),
        None => len,
    };
    if start >= end {
        return Vec::new();
    }
    samples[start..end].to_vec()
}

fn ms_to_sample(ms: f64, rate: u32) -> usize {
    if ms <= 0.0 {
        0
    } else {
        ((ms * rate as f64) / 1000.0).floor() as usize
    }
}

/// Reverses sample order.
pub fn reverse(samples: &[f32]) -> Vec<f32> {
    let mut out = samples.to_vec();
    out.reverse();
    out
}

/// Concatenates `self` followed by `other`. Caller is responsible for
/// verifying matching rate/channel count before calling per-channel.
pub fn concat(a: &[f32], b: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// Sample-wise `a[i] + gain_db·b[i]`, zero-extending the shorter buffer.
/// Output length is `max(a.len(), b.len())`.
pub fn mix(a: &[f32], b: &[f32], gain_db: f64) -> Vec<f32> {
    let factor = db_to_linear(gain_db) as f32;
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let av = a.get(i).copied().unwrap_or(0.0);
            let bv = b.get(i).copied().unwrap_or(0.0);
            av + factor * bv
        })
        .collect()
}

/// Linear-interpolation resample by `rate_factor` (pitch shifts with speed;
/// this is not a pitch-preserving time stretch). `rate_factor > 0` required.
/// Output length is `round(N / rate_factor)`.
pub fn speed(samples: &[f32], rate_factor: f64) -> SonoraResult<Vec<f32>> {
    if !(rate_factor > 0.0) {
        return Err(SonoraError::InvalidSpeedRate(rate_factor));
    }
    let n = samples.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let out_len = (n as f64 / rate_factor).round() as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let s = i as f64 * rate_factor;
        let idx = s.floor() as usize;
        let f = s - s.floor();
        let a = samples[idx.min(n - 1)];
        let b = samples[(idx + 1).min(n - 1)];
        out.push(a as f64 * (1.0 - f) + b as f64 * f);
    }
    Ok(out.into_iter().map(|x| x as f32).collect())
}

/// Finds the first/last sample index (across all channels) whose magnitude
/// exceeds `threshold_db`, expands by `head_ms`/`tail_ms`, and slices every
/// channel to that range. If no sample exceeds the threshold, every
/// channel is returned unchanged.
///
/// Uses windowed-RMS scanning (100-sample windows) rather than
/// sample-level peak thresholding, matching the documented design intent
/// over a stricter per-sample check.
pub fn trim_silence(
    channels: &[Vec<f32>],
    threshold_db: f64,
    head_ms: f64,
    tail_ms: f64,
    rate: u32,
) -> Vec<Vec<f32>> {
    const WINDOW: usize = 100;

    let len = channels.iter().map(|c| c.len()).max().unwrap_or(0);
    if len == 0 {
        return channels.to_vec();
    }

    let threshold_linear = db_to_linear(threshold_db);
    let mut window_rms = vec![0.0_f64; len];
    for ch in channels {
        let mut sum_sq = 0.0_f64;
        let mut window: std::collections::VecDeque<f64> = std::collections::VecDeque::new();
        for (i, slot) in window_rms.iter_mut().enumerate().take(len) {
            let s = ch.get(i).copied().unwrap_or(0.0) as f64;
            let sq = s * s;
            sum_sq += sq;
            window.push_back(sq);
            if window.len() > WINDOW {
                sum_sq -= window.pop_front().unwrap();
            }
            let rms = (sum_sq / window.len() as f64).sqrt();
            if rms > *slot {
                *slot = rms;
            }
        }
    }

    let first = window_rms.iter().position(|&r| r > threshold_linear);
    let last = window_rms.iter().rposition(|&r| r > threshold_linear);

    let (first, last) = match (first, last) {
        (Some(f), Some(l)) => (f, l),
        _ => return channels.to_vec(),
    };

    let head_samples = ms_to_sample(head_ms, rate);
    let tail_samples = ms_to_sample(tail_ms, rate);
    let start = first.saturating_sub(head_samples);
    let end = (last + 1 + tail_samples).min(len);

    channels
        .iter()
        .map(|ch| {
            let ch_end = end.min(ch.len());
            if start >= ch_end {
                Vec::new()
            } else {
                ch[start..ch_end].to_vec()
            }
        })
        .collect()
}

/// Computes the stereo-matched linear gain that brings `channels` to
/// `target_lufs`, then caps it so the resulting true peak does not exceed
/// `peak_limit_dbtp`. Returns the gain only; applying it is the caller's
/// responsibility (so the same scalar can be applied identically to every
/// channel, preserving the stereo image).
pub fn normalize_loudness_gain(
    channels: &[Vec<f32>],
    rate: u32,
    target_lufs: f64,
    peak_limit_dbtp: f64,
) -> SonoraResult<f64> {
    let measured = measure_lufs(channels, rate)?;
    if measured == f64::NEG_INFINITY {
        return Ok(1.0);
    }

    let mut gain = db_to_linear(target_lufs - measured);

    let peak = true_peak_multichannel(channels);
    let peak_limit_linear = db_to_linear(peak_limit_dbtp);
    if peak * gain > peak_limit_linear {
        gain = peak_limit_linear / peak;
    }

    Ok(gain)
}

/// Applies `normalize_loudness_gain`'s result to every channel.
pub fn normalize_loudness(
    channels: &[Vec<f32>],
    rate: u32,
    target_lufs: f64,
    peak_limit_dbtp: f64,
) -> SonoraResult<Vec<Vec<f32>>> {
    let g = normalize_loudness_gain(channels, rate, target_lufs, peak_limit_dbtp)?;
    let factor = g as f32;
    Ok(channels
        .iter()
        .map(|ch| ch.iter().map(|&x| x * factor).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_zero_db_is_identity() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(gain(&input, 0.0), input);
    }

    #[test]
    fn gain_minus_inf_silences() {
        let input = vec![0.1, -0.2, 0.3];
        let out = gain(&input, f64::NEG_INFINITY);
        assert!(out.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn fade_in_starts_at_zero_ends_at_original() {
        let input = vec![1.0_f32; 100];
        let out = fade_in(&input, 10.0, 1000); // 10 samples
        assert_eq!(out[0], 0.0);
        assert!((out[9] - 1.0).abs() < 1e-6);
        assert_eq!(out[50], 1.0);
    }

    #[test]
    fn fade_out_ends_at_zero() {
        let input = vec![1.0_f32; 100];
        let out = fade_out(&input, 10.0, 1000);
        assert!((out[99] - 0.0).abs() < 1e-6);
        assert_eq!(out[0], 1.0);
    }

    #[test]
    fn fade_region_exceeding_track_ramps_whole_track() {
        let input = vec![1.0_f32; 5];
        let out = fade_in(&input, 1000.0, 1000); // would request 1000 samples
        assert_eq!(out[0], 0.0);
        assert!((out[4] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn slice_extracts_range() {
        let input: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let out = slice(&input, 10.0, Some(20.0), 1000); // samples [10,20)
        assert_eq!(out, (10..20).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn slice_end_absent_goes_to_end() {
        let input: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let out = slice(&input, 5.0, None, 1000);
        assert_eq!(out, vec![5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn reverse_mirrors() {
        let input = vec![1.0, 2.0, 3.0];
        assert_eq!(reverse(&input), vec![3.0, 2.0, 1.0]);
        assert_eq!(reverse(&reverse(&input)), input);
    }

    #[test]
    fn concat_length_additivity() {
        let a = vec![1.0, 2.0];
        let b = vec![3.0, 4.0, 5.0];
        let out = concat(&a, &b);
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn mix_with_silence_is_noop_on_a() {
        let a = vec![0.5, -0.5, 0.25];
        let silence = vec![0.0, 0.0, 0.0];
        assert_eq!(mix(&a, &silence, 0.0), a);
    }

    #[test]
    fn mix_output_length_is_max() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(mix(&a, &b, 0.0).len(), 4);
    }

    #[test]
    fn speed_one_is_identity() {
        let input = vec![1.0, 2.0, 3.0, 4.0];
        let out = speed(&input, 1.0).unwrap();
        assert_eq!(out.len(), input.len());
        for (a, b) in out.iter().zip(input.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn speed_rejects_non_positive_rate() {
        assert!(matches!(
            speed(&[1.0, 2.0], 0.0),
            Err(SonoraError::InvalidSpeedRate(_))
        ));
        assert!(matches!(
            speed(&[1.0, 2.0], -1.0),
            Err(SonoraError::InvalidSpeedRate(_))
        ));
    }

    #[test]
    fn speed_doubles_shrinks_length_by_half() {
        let input = vec![0.0_f32; 1000];
        let out = speed(&input, 2.0).unwrap();
        assert_eq!(out.len(), 500);
    }

    #[test]
    fn trim_silence_silence_tone_silence() {
        let mut ch = vec![0.0_f32; 500];
        for sample in ch.iter_mut().skip(100).take(200) {
            *sample = 0.5;
        }
        let trimmed = trim_silence(&[ch], -30.0, 0.0, 0.0, 1000);
        assert!(trimmed[0].len() < 500);
        assert!(trimmed[0].len() >= 200);
    }

    #[test]
    fn trim_silence_no_signal_above_threshold_returns_unchanged() {
        let ch = vec![0.0_f32; 500];
        let trimmed = trim_silence(&[ch.clone()], -30.0, 10.0, 50.0, 1000);
        assert_eq!(trimmed[0].len(), ch.len());
    }

    #[test]
    fn normalize_loudness_silence_returns_unity_gain() {
        let ch = vec![0.0_f32; 48_000];
        let g = normalize_loudness_gain(&[ch.clone(), ch], 48_000, -14.0, -1.5).unwrap();
        assert_eq!(g, 1.0);
    }

    #[test]
    fn normalize_loudness_caps_gain_to_peak_limit() {
        // A full-scale signal already near 0 dBFS should have its gain
        // capped well below what the loudness target alone would request.
        let mut ch = vec![0.0_f32; 48_000];
        for (i, s) in ch.iter_mut().enumerate() {
            *s = (i as f64 * 0.1).sin() as f32;
        }
        let gain_value = normalize_loudness_gain(&[ch.clone(), ch.clone()], 48_000, -14.0, -1.5)
            .unwrap();
        let peak = true_peak_multichannel(&[ch.clone(), ch]);
        let limit = db_to_linear(-1.5);
        assert!(peak * gain_value <= limit + 1e-6);
    }
}
