//! Cross-cutting scenario tests spanning construction, measurement, and
//! export in a single pass, as opposed to the per-module unit tests kept
//! alongside the code they exercise.

use sonora_track::Track;

fn sine(freq: f64, amplitude: f32, rate: u32, duration_secs: f64) -> Vec<f32> {
    let n = (rate as f64 * duration_secs) as usize;
    (0..n)
        .map(|i| {
            (amplitude as f64 * (2.0 * std::f64::consts::PI * freq * i as f64 / rate as f64).sin())
                as f32
        })
        .collect()
}

#[test]
fn full_scale_997hz_sine_measures_in_documented_band() {
    let ch = sine(997.0, 1.0, 48_000, 1.0);
    let t = Track::from_channels(vec![ch.clone(), ch], 48_000).unwrap();
    let lufs = t.loudness().unwrap();
    assert!((-3.5..=-2.5).contains(&lufs), "got {lufs}");
}

#[test]
fn attenuated_997hz_sine_measures_in_documented_band() {
    let amplitude = 10f64.powf(-20.0 / 20.0) as f32;
    let ch = sine(997.0, amplitude, 48_000, 1.0);
    let t = Track::from_channels(vec![ch.clone(), ch], 48_000).unwrap();
    let lufs = t.loudness().unwrap();
    assert!((-23.5..=-22.5).contains(&lufs), "got {lufs}");
}

#[test]
fn single_impulse_true_peak_is_at_least_unity() {
    let mut ch = vec![0.0_f32; 1024];
    ch[512] = 1.0;
    let t = Track::from_channels(vec![ch], 48_000).unwrap();
    assert!(t.true_peak() >= 1.0);
}

#[test]
fn adjacent_near_full_scale_samples_overshoot_sample_peak() {
    let mut ch = vec![0.0_f32; 1024];
    ch[511] = 0.9;
    ch[512] = -0.9;
    let t = Track::from_channels(vec![ch], 48_000).unwrap();
    assert!(t.true_peak() > 0.9);
}

#[test]
fn wav_byte_layout_matches_documented_interleaving() {
    let l = vec![0.5_f32, -0.5];
    let r = vec![0.25_f32, -0.25];
    let t = Track::from_channels(vec![l, r], 44_100).unwrap();
    let bytes = t.to_wav().unwrap();

    let data = &bytes[44..];
    let sample_at = |i: usize| -> i16 { i16::from_le_bytes([data[i * 2], data[i * 2 + 1]]) };
    let (l0, r0, l1, r1) = (sample_at(0), sample_at(1), sample_at(2), sample_at(3));
    assert!(l0 > r0 && r0 > 0 && 0 > r1 && r1 > l1);
}

#[test]
fn silence_tone_silence_trims_shorter_with_early_signal() {
    let mut ch = vec![0.0_f32; 900]; // 200ms silence + 500ms tone + 200ms silence @ 1kHz
    for sample in ch.iter_mut().skip(200).take(500) {
        *sample = 0.5;
    }
    let t = Track::from_channels(vec![ch], 1000).unwrap();
    let trimmed = t.trim_silence_default();
    assert!(trimmed.length() < t.length());
    let pcm = trimmed.to_pcm();
    assert!(pcm.channels[0].iter().take(100).any(|&s| s.abs() > 0.01));
}

#[tokio::test]
async fn from_buffer_round_trips_through_wav_bytes() {
    let ch = sine(440.0, 0.5, 44_100, 0.05);
    let t = Track::from_channels(vec![ch.clone(), ch], 44_100).unwrap();
    let bytes = t.to_wav().unwrap();

    let decoded = Track::from_buffer(bytes).await.unwrap();
    assert_eq!(decoded.sample_rate(), 44_100);
    assert_eq!(decoded.channel_count(), 2);
    assert_eq!(decoded.length(), t.length());
}

#[test]
fn normalize_then_mp3_encode_produces_nonempty_bytes() {
    let ch = sine(997.0, 0.2, 44_100, 0.5);
    let t = Track::from_channels(vec![ch.clone(), ch], 44_100)
        .unwrap()
        .normalize_loudness_default()
        .unwrap();
    let mp3 = t.to_mp3_default().unwrap();
    assert!(!mp3.is_empty());
}
