//! Compressed-audio decode (MP3/OGG/FLAC/AAC), delegated to `symphonia`.
//!
//! Grounded on `read_audio`/`copy_audio_buffer` in the donor's
//! `audio_file.rs`: probe from an in-memory byte buffer rather than a file
//! path, decode every packet of the first audio track, deinterleave into
//! `Vec<Vec<f32>>`.

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{CodecError, CodecResult};

/// Decodes a compressed-audio byte buffer (MP3/OGG/FLAC/AAC) into
/// deinterleaved channel sample arrays and a sample rate.
///
/// The format is sniffed by `symphonia`'s probe, not by extension (there is
/// no filename available from a raw buffer).
pub fn decode(bytes: &[u8]) -> CodecResult<(Vec<Vec<f32>>, u32)> {
    let cursor = std::io::Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), MediaSourceStreamOptions::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| {
            log::warn!("compressed-audio probe failed: {e}");
            CodecError::DecodeFailed(e.to_string())
        })?;

    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| CodecError::DecodeFailed("no audio track found".to_string()))?;

    let track_id = track.id;
    let num_channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(2);
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| CodecError::DecodeFailed(e.to_string()))?;

    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); num_channels];

    loop {
        match format_reader.next_packet() {
            Ok(packet) => {
                if packet.track_id() != track_id {
                    continue;
                }
                match decoder.decode(&packet) {
                    Ok(decoded) => copy_into(&decoded, &mut channels),
                    Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
                    Err(e) => return Err(CodecError::DecodeFailed(e.to_string())),
                }
            }
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(CodecError::DecodeFailed(e.to_string())),
        }
    }

    Ok((channels, sample_rate))
}

fn copy_into(buffer: &AudioBufferRef, output: &mut [Vec<f32>]) {
    match buffer {
        AudioBufferRef::F32(buf) => {
            for (ch, out_ch) in output.iter_mut().enumerate() {
                if ch < buf.spec().channels.count() {
                    out_ch.extend(buf.chan(ch).iter().copied());
                }
            }
        }
        AudioBufferRef::F64(buf) => {
            for (ch, out_ch) in output.iter_mut().enumerate() {
                if ch < buf.spec().channels.count() {
                    out_ch.extend(buf.chan(ch).iter().map(|&s| s as f32));
                }
            }
        }
        AudioBufferRef::S16(buf) => {
            for (ch, out_ch) in output.iter_mut().enumerate() {
                if ch < buf.spec().channels.count() {
                    out_ch.extend(buf.chan(ch).iter().map(|&s| s as f32 / 32768.0));
                }
            }
        }
        AudioBufferRef::S24(buf) => {
            for (ch, out_ch) in output.iter_mut().enumerate() {
                if ch < buf.spec().channels.count() {
                    out_ch.extend(buf.chan(ch).iter().map(|s| s.0 as f32 / 8_388_608.0));
                }
            }
        }
        AudioBufferRef::S32(buf) => {
            for (ch, out_ch) in output.iter_mut().enumerate() {
                if ch < buf.spec().channels.count() {
                    out_ch.extend(buf.chan(ch).iter().map(|&s| s as f32 / 2_147_483_648.0));
                }
            }
        }
        AudioBufferRef::U8(buf) => {
            for (ch, out_ch) in output.iter_mut().enumerate() {
                if ch < buf.spec().channels.count() {
                    out_ch.extend(
                        buf.chan(ch)
                            .iter()
                            .map(|&s| (s as f32 - 128.0) / 128.0),
                    );
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = decode(&[0u8; 64]);
        assert!(result.is_err());
    }
}
