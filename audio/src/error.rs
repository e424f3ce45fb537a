//! Error types for PCM processing.

use thiserror::Error;

use crate::pcm::Format;

/// Result type alias for audio operations.
pub type Result<T> = std::result::Result<T, AudioError>;

/// Error type for PCM processing, resampling and codec operations.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Sample rate or channel count is zero.
    #[error("invalid format: {0}")]
    InvalidFormat(Format),

    /// Sample data does not divide into whole frames.
    #[error("{len} samples do not divide into frames of {channels} channels")]
    Misaligned { len: usize, channels: u16 },

    /// Two buffers were combined without being reconciled first.
    #[error("format mismatch: base is {base}, overlay is {overlay}")]
    FormatMismatch { base: Format, overlay: Format },

    /// Two multi-channel layouts cannot be reconciled without a downmix.
    #[error("cannot reconcile {a} with {b} without downmixing")]
    ChannelLayout { a: Format, b: Format },

    /// Overlay position is negative or not finite.
    #[error("invalid overlay position: {0} ms")]
    InvalidPosition(f64),

    /// Resampler construction or processing failed.
    #[error("resample error: {0}")]
    Resample(String),

    /// Input bytes could not be decoded to PCM.
    #[error("decode error: {0}")]
    Decode(String),

    /// PCM could not be encoded to the output codec.
    #[error("encode error: {0}")]
    Encode(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(e: rubato::ResampleError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(e: symphonia::core::errors::Error) -> Self {
        AudioError::Decode(e.to_string())
    }
}

impl From<hound::Error> for AudioError {
    fn from(e: hound::Error) -> Self {
        AudioError::Encode(e.to_string())
    }
}
