//! Codec error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid WAV data: {0}")]
    InvalidWav(String),

    #[error("decode failed: {0}")]
    DecodeFailed(String),

    #[error("encode failed: {0}")]
    EncodeFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CodecResult<T> = Result<T, CodecError>;

impl From<hound::Error> for CodecError {
    fn from(err: hound::Error) -> Self {
        CodecError::InvalidWav(err.to_string())
    }
}

impl From<CodecError> for sonora_core::SonoraError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidWav(msg) => sonora_core::SonoraError::InvalidWav(msg),
            CodecError::DecodeFailed(msg) => sonora_core::SonoraError::DecodeFailed(msg),
            CodecError::EncodeFailed(msg) => sonora_core::SonoraError::DecodeFailed(msg),
            CodecError::Io(err) => sonora_core::SonoraError::DecodeFailed(err.to_string()),
        }
    }
}
