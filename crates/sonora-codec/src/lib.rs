//! sonora-codec: audio byte-buffer codecs.
//!
//! - `wav` - canonical 16-bit PCM RIFF/WAVE, read/written in-house
//! - `decode` - compressed-format decode (MP3/OGG/FLAC/AAC), delegated to `symphonia`
//! - `mp3` - MP3 encode, delegated to `mp3lame-encoder`

mod decode;
mod error;
mod mp3;
mod wav;

pub use error::{CodecError, CodecResult};
pub use wav::{decode as decode_wav, encode as encode_wav};

pub use decode::decode as decode_compressed;
pub use mp3::encode as encode_mp3;
