//! The immutable `Track` façade: construction, measurement, chained
//! transforms, and export.
//!
//! Grounded on the donor's `AudioData` container (`audio_file.rs`) for the
//! channels/sample_rate bundle shape, generalized from a mutable
//! file-I/O-backed struct into an immutable value whose every transform
//! returns a fresh `Track`.

use sonora_core::{SonoraError, SonoraResult};
use sonora_dsp as dsp;

use crate::defaults;

/// Raw deinterleaved PCM: channel buffers plus sample rate, returned by
/// `Track::to_pcm`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pcm {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

/// An immutable bundle of equal-length channel buffers and a sample rate.
///
/// Every `channels[i]` has identical length `N` (I1); `sample_rate > 0`
/// (I2); construction always copies or takes ownership, never aliasing a
/// caller-visible buffer it doesn't own (I3).
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl Track {
    /// Builds a Track from decoded PCM bytes.
    ///
    /// If the first four bytes are `"RIFF"`, the buffer is parsed as WAV
    /// in-process; otherwise it is handed to the external compressed
    /// decoder. The external decode path is the crate's only suspension
    /// point, run off the calling task via `spawn_blocking` since
    /// `symphonia` is itself synchronous.
    pub async fn from_buffer(bytes: Vec<u8>) -> SonoraResult<Track> {
        let (channels, sample_rate) = if bytes.len() >= 4 && &bytes[0..4] == b"RIFF" {
            sonora_codec::decode_wav(&bytes).map_err(SonoraError::from)?
        } else {
            tokio::task::spawn_blocking(move || sonora_codec::decode_compressed(&bytes))
                .await
                .map_err(|e| SonoraError::DecodeFailed(e.to_string()))?
                .map_err(SonoraError::from)?
        };
        Track::from_channels(channels, sample_rate)
    }

    /// Builds a Track from already-decoded channel buffers.
    ///
    /// Requires a non-empty channel set, 1 or 2 channels (mono/stereo —
    /// the façade supports no more), and equal-length buffers.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> SonoraResult<Track> {
        if sample_rate == 0 {
            return Err(SonoraError::InvalidWav(
                "sample_rate must be > 0".to_string(),
            ));
        }
        if channels.is_empty() {
            log::warn!("Track construction rejected an empty channel set");
            return Err(SonoraError::InvalidWav(
                "channels must be non-empty".to_string(),
            ));
        }
        if channels.len() > 2 {
            log::warn!(
                "Track construction rejected unsupported channel count: {}",
                channels.len()
            );
            return Err(SonoraError::UnsupportedChannelCount(channels.len()));
        }
        let len = channels[0].len();
        for ch in &channels[1..] {
            if ch.len() != len {
                log::warn!(
                    "Track construction rejected channels of differing length: {len} vs {}",
                    ch.len()
                );
                return Err(SonoraError::ChannelLengthMismatch {
                    a: len,
                    b: ch.len(),
                });
            }
        }
        Ok(Track {
            channels,
            sample_rate,
        })
    }

    /// Allocates a zero-filled Track of the given duration. `channel_count`
    /// must be 1 (mono) or 2 (stereo).
    pub fn silence(duration_ms: f64, rate: u32, channel_count: usize) -> SonoraResult<Track> {
        if channel_count == 0 || channel_count > 2 {
            log::warn!("Track::silence rejected unsupported channel count: {channel_count}");
            return Err(SonoraError::UnsupportedChannelCount(channel_count));
        }
        let num_samples = ((duration_ms * rate as f64) / 1000.0).round().max(0.0) as usize;
        Ok(Track {
            channels: vec![vec![0.0_f32; num_samples]; channel_count],
            sample_rate: rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn length(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn duration_sec(&self) -> f64 {
        self.length() as f64 / self.sample_rate as f64
    }

    /// Returns a copy of channel `index`.
    pub fn get_channel(&self, index: usize) -> SonoraResult<Vec<f32>> {
        self.channels
            .get(index)
            .cloned()
            .ok_or(SonoraError::ChannelIndexOutOfRange {
                index,
                channel_count: self.channels.len(),
            })
    }

    /// Integrated loudness in LUFS; `-inf` for silent or sub-400ms input.
    pub fn loudness(&self) -> SonoraResult<f64> {
        dsp::measure_lufs(&self.channels, self.sample_rate)
    }

    /// Maximum true peak (linear) across all channels.
    pub fn true_peak(&self) -> f64 {
        dsp::true_peak_multichannel(&self.channels)
    }

    /// Linear RMS across all channels (not dB, despite the name reading
    /// like a level meter — see the crate's documented numeric convention).
    pub fn rms(&self) -> f64 {
        let mut sum_sq = 0.0_f64;
        let mut count = 0usize;
        for ch in &self.channels {
            for &s in ch {
                sum_sq += (s as f64) * (s as f64);
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            (sum_sq / count as f64).sqrt()
        }
    }

    fn with_channels(&self, channels: Vec<Vec<f32>>) -> Track {
        Track {
            channels,
            sample_rate: self.sample_rate,
        }
    }

    pub fn gain(&self, db: f64) -> Track {
        let channels = self
            .channels
            .iter()
            .map(|ch| dsp::gain(ch, db))
            .collect();
        self.with_channels(channels)
    }

    pub fn fade_in(&self, ms: f64) -> Track {
        let channels = self
            .channels
            .iter()
            .map(|ch| dsp::fade_in(ch, ms, self.sample_rate))
            .collect();
        self.with_channels(channels)
    }

    pub fn fade_out(&self, ms: f64) -> Track {
        let channels = self
            .channels
            .iter()
            .map(|ch| dsp::fade_out(ch, ms, self.sample_rate))
            .collect();
        self.with_channels(channels)
    }

    pub fn slice(&self, start_ms: f64, end_ms: Option<f64>) -> Track {
        let channels = self
            .channels
            .iter()
            .map(|ch| dsp::slice(ch, start_ms, end_ms, self.sample_rate))
            .collect();
        self.with_channels(channels)
    }

    pub fn reverse(&self) -> Track {
        let channels = self.channels.iter().map(|ch| dsp::reverse(ch)).collect();
        self.with_channels(channels)
    }

    /// Concatenates `self` followed by `other`. Requires matching rate and
    /// channel count.
    pub fn concat(&self, other: &Track) -> SonoraResult<Track> {
        self.require_compatible(other)?;
        let channels = self
            .channels
            .iter()
            .zip(other.channels.iter())
            .map(|(a, b)| dsp::concat(a, b))
            .collect();
        Ok(self.with_channels(channels))
    }

    /// Mixes `other` into `self` at `gain_db` (default `0.0`). Requires
    /// matching rate and channel count; output length is the longer input.
    pub fn mix(&self, other: &Track, gain_db: f64) -> SonoraResult<Track> {
        self.require_compatible(other)?;
        let channels = self
            .channels
            .iter()
            .zip(other.channels.iter())
            .map(|(a, b)| dsp::mix(a, b, gain_db))
            .collect();
        Ok(self.with_channels(channels))
    }

    /// Linear-interpolation resample by `rate_factor`; sample rate is
    /// unchanged, so pitch shifts with speed. Requires `rate_factor > 0`.
    pub fn speed(&self, rate_factor: f64) -> SonoraResult<Track> {
        let channels = self
            .channels
            .iter()
            .map(|ch| dsp::speed(ch, rate_factor))
            .collect::<SonoraResult<_>>()?;
        Ok(self.with_channels(channels))
    }

    /// Trims leading/trailing silence using windowed-RMS scanning, keeping
    /// `head_ms`/`tail_ms` of padding around the detected signal region.
    pub fn trim_silence(&self, threshold_db: f64, head_ms: f64, tail_ms: f64) -> Track {
        let channels = dsp::trim_silence(
            &self.channels,
            threshold_db,
            head_ms,
            tail_ms,
            self.sample_rate,
        );
        self.with_channels(channels)
    }

    /// `trim_silence` with the repository's documented defaults
    /// (`-30 dB`, `10ms` head, `50ms` tail).
    pub fn trim_silence_default(&self) -> Track {
        self.trim_silence(
            defaults::TRIM_SILENCE_THRESHOLD_DB,
            defaults::TRIM_SILENCE_HEAD_MS,
            defaults::TRIM_SILENCE_TAIL_MS,
        )
    }

    /// Normalizes to `target_lufs`, capping the result so true peak never
    /// exceeds `peak_limit_dbtp`. A no-op on silent/too-short input.
    pub fn normalize_loudness(
        &self,
        target_lufs: f64,
        peak_limit_dbtp: f64,
    ) -> SonoraResult<Track> {
        let channels =
            dsp::normalize_loudness(&self.channels, self.sample_rate, target_lufs, peak_limit_dbtp)?;
        Ok(self.with_channels(channels))
    }

    /// `normalize_loudness` with the repository's documented defaults
    /// (`-14 LUFS`, `-1.5 dBTP`).
    pub fn normalize_loudness_default(&self) -> SonoraResult<Track> {
        self.normalize_loudness(defaults::TARGET_LUFS, defaults::PEAK_LIMIT_DBTP)
    }

    fn require_compatible(&self, other: &Track) -> SonoraResult<()> {
        if self.sample_rate != other.sample_rate {
            return Err(SonoraError::SampleRateMismatch {
                a: self.sample_rate,
                b: other.sample_rate,
            });
        }
        if self.channels.len() != other.channels.len() {
            return Err(SonoraError::ChannelCountMismatch {
                a: self.channels.len(),
                b: other.channels.len(),
            });
        }
        Ok(())
    }

    /// Serializes to canonical 16-bit PCM RIFF/WAVE bytes.
    pub fn to_wav(&self) -> SonoraResult<Vec<u8>> {
        sonora_codec::encode_wav(&self.channels, self.sample_rate).map_err(SonoraError::from)
    }

    /// Encodes to MP3 at `bitrate_kbps` (default `128`).
    pub fn to_mp3(&self, bitrate_kbps: u32) -> SonoraResult<Vec<u8>> {
        sonora_codec::encode_mp3(&self.channels, self.sample_rate, bitrate_kbps)
            .map_err(SonoraError::from)
    }

    /// `to_mp3` with the repository's documented default bitrate (128 kbps).
    pub fn to_mp3_default(&self) -> SonoraResult<Vec<u8>> {
        self.to_mp3(defaults::MP3_BITRATE_KBPS)
    }

    /// Copies out the channel buffers and sample rate.
    pub fn to_pcm(&self) -> Pcm {
        Pcm {
            channels: self.channels.clone(),
            sample_rate: self.sample_rate,
        }
    }
}
