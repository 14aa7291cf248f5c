//! Named default parameters for transforms, so call sites read as intent
//! (`defaults::TARGET_LUFS`) rather than bare magic numbers.

/// `normalize_loudness` target, in LUFS.
pub const TARGET_LUFS: f64 = -14.0;
/// `normalize_loudness` true-peak ceiling, in dBTP.
pub const PEAK_LIMIT_DBTP: f64 = -1.5;

/// `trim_silence` RMS threshold, in dB.
pub const TRIM_SILENCE_THRESHOLD_DB: f64 = -30.0;
/// `trim_silence` padding kept before the first loud sample, in ms.
pub const TRIM_SILENCE_HEAD_MS: f64 = 10.0;
/// `trim_silence` padding kept after the last loud sample, in ms.
pub const TRIM_SILENCE_TAIL_MS: f64 = 50.0;

/// `to_mp3` bitrate, in kbps.
pub const MP3_BITRATE_KBPS: u32 = 128;
