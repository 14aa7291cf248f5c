//! MP3 encoding via `mp3lame-encoder`, delegated entirely to the external
//! LAME bindings per the codec's out-of-scope boundary for lossy encode.
//!
//! Grounded on `write_mp3` in the donor's `bounce.rs`: same `Builder`
//! configuration, bitrate table, and `MaybeUninit<u8>` output buffer,
//! adapted to return bytes instead of writing to a file path.

use std::mem::MaybeUninit;

use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, Quality};

use crate::error::{CodecError, CodecResult};

fn bitrate_enum(bitrate_kbps: u32) -> Bitrate {
    match bitrate_kbps {
        0..=96 => Bitrate::Kbps96,
        97..=112 => Bitrate::Kbps112,
        113..=128 => Bitrate::Kbps128,
        129..=160 => Bitrate::Kbps160,
        161..=192 => Bitrate::Kbps192,
        193..=224 => Bitrate::Kbps224,
        225..=256 => Bitrate::Kbps256,
        _ => Bitrate::Kbps320,
    }
}

/// Encodes deinterleaved mono/stereo channel buffers to MP3 at the given
/// bitrate (kbps).
pub fn encode(channels: &[Vec<f32>], rate: u32, bitrate_kbps: u32) -> CodecResult<Vec<u8>> {
    let num_channels = channels.len();
    if num_channels == 0 || num_channels > 2 {
        return Err(CodecError::EncodeFailed(format!(
            "MP3 only supports 1 or 2 channels, got {num_channels}"
        )));
    }

    let mut builder = Builder::new()
        .ok_or_else(|| CodecError::EncodeFailed("failed to create LAME encoder".to_string()))?;

    builder
        .set_sample_rate(rate)
        .map_err(|e| CodecError::EncodeFailed(format!("invalid sample rate: {e:?}")))?;
    builder
        .set_num_channels(num_channels as u8)
        .map_err(|e| CodecError::EncodeFailed(format!("invalid channel count: {e:?}")))?;
    builder
        .set_brate(bitrate_enum(bitrate_kbps))
        .map_err(|e| CodecError::EncodeFailed(format!("invalid bitrate: {e:?}")))?;
    builder
        .set_quality(Quality::Best)
        .map_err(|e| CodecError::EncodeFailed(format!("failed to set quality: {e:?}")))?;

    let mut encoder = builder
        .build()
        .map_err(|e| CodecError::EncodeFailed(format!("failed to build encoder: {e:?}")))?;

    let num_frames = channels.iter().map(|c| c.len()).max().unwrap_or(0);
    let mut interleaved: Vec<i16> = Vec::with_capacity(num_frames * num_channels);
    for frame in 0..num_frames {
        for ch in channels {
            let sample = ch.get(frame).copied().unwrap_or(0.0);
            interleaved.push((sample.clamp(-1.0, 1.0) * 32767.0) as i16);
        }
    }

    let max_output_size = (num_frames as f64 * 1.25) as usize + 7200;
    let mut mp3_buffer: Vec<MaybeUninit<u8>> = vec![MaybeUninit::uninit(); max_output_size];

    let input = InterleavedPcm(&interleaved);
    let encoded_size = encoder
        .encode(input, &mut mp3_buffer)
        .map_err(|e| CodecError::EncodeFailed(format!("MP3 encoding failed: {e:?}")))?;

    let flush_size = encoder
        .flush::<FlushNoGap>(&mut mp3_buffer[encoded_size..])
        .map_err(|e| CodecError::EncodeFailed(format!("MP3 flush failed: {e:?}")))?;

    let total_size = encoded_size + flush_size;
    let bytes: Vec<u8> = mp3_buffer[..total_size]
        .iter()
        .map(|m| unsafe { m.assume_init() })
        .collect();

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_channels() {
        assert!(encode(&[], 44_100, 128).is_err());
    }

    #[test]
    fn rejects_too_many_channels() {
        let channels = vec![vec![0.0_f32; 10]; 3];
        assert!(encode(&channels, 44_100, 128).is_err());
    }

    #[test]
    fn encodes_short_mono_buffer_to_nonempty_mp3() {
        let ch = vec![0.1_f32; 4096];
        let bytes = encode(&[ch], 44_100, 128).unwrap();
        assert!(!bytes.is_empty());
    }
}
