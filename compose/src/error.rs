//! Error types for the compositor.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mixdown_audio::AudioError;

/// Result type alias for compositor operations.
pub type Result<T> = std::result::Result<T, ComposeError>;

/// Identifies which input clip an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipRef {
    /// The narration track.
    Narration,
    /// A sound effect, by its index in the request's `sfx_list`.
    Sfx(usize),
    /// The background music bed.
    Music,
}

impl fmt::Display for ClipRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipRef::Narration => write!(f, "narration"),
            ClipRef::Sfx(i) => write!(f, "sfx[{}]", i),
            ClipRef::Music => write!(f, "music"),
        }
    }
}

/// Error category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    ValidationError,
    AcquisitionError,
    DecodeError,
    MixError,
    EncodeError,
}

/// Error type for one `compose` invocation.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// The request is missing or has malformed required fields.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A clip could not be retrieved.
    #[error("failed to acquire {clip}: {detail}")]
    Acquisition { clip: ClipRef, detail: String },

    /// Retrieved bytes could not be decoded as audio.
    #[error("failed to decode {clip}: {detail}")]
    Decode { clip: ClipRef, detail: String },

    /// An internal mixing invariant was violated.
    #[error("mix failed: {0}")]
    Mix(String),

    /// The final buffer could not be encoded or delivered.
    #[error("encode failed: {0}")]
    Encode(String),
}

impl ComposeError {
    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ComposeError::Validation(_) => ErrorCategory::ValidationError,
            ComposeError::Acquisition { .. } => ErrorCategory::AcquisitionError,
            ComposeError::Decode { .. } => ErrorCategory::DecodeError,
            ComposeError::Mix(_) => ErrorCategory::MixError,
            ComposeError::Encode(_) => ErrorCategory::EncodeError,
        }
    }

    /// Returns the clip this error refers to, if any.
    pub fn clip(&self) -> Option<ClipRef> {
        match self {
            ComposeError::Acquisition { clip, .. } | ComposeError::Decode { clip, .. } => {
                Some(*clip)
            }
            _ => None,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        ComposeError::Validation(msg.into())
    }
}

impl From<AudioError> for ComposeError {
    fn from(e: AudioError) -> Self {
        ComposeError::Mix(e.to_string())
    }
}

/// Failure reported by a resource loader.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Source unreachable, non-success response, stream error or timeout.
    #[error("{0}")]
    Acquisition(String),

    /// Bytes were retrieved but are not decodable audio.
    #[error("{0}")]
    Decode(String),
}

impl LoadError {
    /// Attaches the clip identity, producing a compositor error.
    pub fn for_clip(self, clip: ClipRef) -> ComposeError {
        match self {
            LoadError::Acquisition(detail) => ComposeError::Acquisition { clip, detail },
            LoadError::Decode(detail) => ComposeError::Decode { clip, detail },
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LoadError::Acquisition(format!("timed out: {}", e))
        } else {
            LoadError::Acquisition(e.to_string())
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Acquisition(e.to_string())
    }
}

impl From<AudioError> for LoadError {
    fn from(e: AudioError) -> Self {
        match e {
            AudioError::Io(e) => LoadError::Acquisition(e.to_string()),
            other => LoadError::Decode(other.to_string()),
        }
    }
}

/// Failure reported by an encoder.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct EncodeError(pub String);

impl From<AudioError> for EncodeError {
    fn from(e: AudioError) -> Self {
        EncodeError(e.to_string())
    }
}

impl From<EncodeError> for ComposeError {
    fn from(e: EncodeError) -> Self {
        ComposeError::Encode(e.0)
    }
}
