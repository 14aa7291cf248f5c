//! Canonical little-endian 16-bit PCM RIFF/WAVE codec, read/written entirely
//! in memory (no file paths) since the façade works from byte buffers.
//!
//! Grounded on `read_wav`/`write_wav` in the donor's `audio_file.rs`, which
//! also uses `hound` for header construction; trimmed to 16-bit PCM only
//! (the donor additionally supported 8/24/32-bit and float) and switched to
//! an in-memory `Cursor` instead of file paths.

use std::io::Cursor;

use crate::error::{CodecError, CodecResult};

/// Float-to-int16 scaling used when encoding. Asymmetric because `i16`'s
/// range is itself asymmetric (`-32768..=32767`): negative samples may use
/// the full `-32768` extent, while `1.0` must map to the largest positive
/// value representable, `32767`.
fn float_to_i16(x: f32) -> i16 {
    let clamped = x.clamp(-1.0, 1.0) as f64;
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

fn i16_to_float(x: i16) -> f32 {
    if x < 0 {
        x as f32 / 32768.0
    } else {
        x as f32 / 32767.0
    }
}

/// Parses a canonical 16-bit PCM RIFF/WAVE buffer into deinterleaved
/// channel sample arrays and a sample rate.
///
/// Rejects any buffer shorter than the 44-byte canonical header, or
/// missing the `RIFF`/`WAVE` magic, with [`CodecError::InvalidWav`].
pub fn decode(bytes: &[u8]) -> CodecResult<(Vec<Vec<f32>>, u32)> {
    if bytes.len() < 44 {
        log::warn!(
            "WAV decode rejected a buffer shorter than the canonical header: {} bytes",
            bytes.len()
        );
        return Err(CodecError::InvalidWav(format!(
            "buffer too short for a WAV header: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        log::warn!("WAV decode rejected a buffer missing the RIFF/WAVE magic");
        return Err(CodecError::InvalidWav(
            "missing RIFF/WAVE magic".to_string(),
        ));
    }

    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    let sample_rate = spec.sample_rate;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(i16_to_float).unwrap_or(0.0))
            .collect(),
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.unwrap_or(0.0))
            .collect(),
    };

    let num_frames = if num_channels == 0 {
        0
    } else {
        interleaved.len() / num_channels
    };
    let mut channels = vec![vec![0.0_f32; num_frames]; num_channels];
    for (frame, chunk) in interleaved.chunks(num_channels).enumerate() {
        if frame >= num_frames {
            break;
        }
        for (ch, &sample) in chunk.iter().enumerate() {
            channels[ch][frame] = sample;
        }
    }

    Ok((channels, sample_rate))
}

/// Serializes deinterleaved channel buffers into a canonical 16-bit PCM
/// RIFF/WAVE buffer: `"RIFF" | size-8 | "WAVE" | "fmt " | 16 | 1 | nch |
/// rate | rate*nch*2 | nch*2 | 16 | "data" | data_size` followed by
/// interleaved int16 samples.
///
/// All channels are assumed equal length; shorter channels are treated as
/// silent past their own length.
pub fn encode(channels: &[Vec<f32>], rate: u32) -> CodecResult<Vec<u8>> {
    let num_channels = channels.len().max(1) as u16;
    let spec = hound::WavSpec {
        channels: num_channels,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let num_frames = channels.iter().map(|c| c.len()).max().unwrap_or(0);
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)?;
        for frame in 0..num_frames {
            for ch in channels {
                let sample = ch.get(frame).copied().unwrap_or(0.0);
                writer.write_sample(float_to_i16(sample))?;
            }
        }
        writer.finalize()?;
    }

    Ok(buffer.into_inner())
}
