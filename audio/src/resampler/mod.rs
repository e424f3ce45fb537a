//! Sample rate and channel conversion.
//!
//! Two interchangeable strategies are provided:
//!
//! - [`ResampleQuality::Linear`]: per-channel linear interpolation, exact and
//!   cheap, the default.
//! - [`ResampleQuality::Fft`]: rubato's synchronous FFT resampler, delay
//!   compensated and trimmed to the same frame count as the linear path.
//!
//! # Example
//!
//! ```rust
//! use mixdown_audio::pcm::{AudioBuffer, Format};
//! use mixdown_audio::resampler::{resample, ResampleQuality};
//!
//! let buf = AudioBuffer::silence(Format::mono(8000), 800).unwrap();
//! let out = resample(buf, 16000, ResampleQuality::Linear).unwrap();
//! assert_eq!(out.frames(), 1600);
//! ```

mod channels;
mod linear;
mod rubato_impl;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pcm::AudioBuffer;

pub use channels::expand_mono;

/// Resampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleQuality {
    /// Linear interpolation.
    #[default]
    Linear,
    /// FFT-based synchronous resampling (rubato).
    Fft,
}

impl fmt::Display for ResampleQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResampleQuality::Linear => write!(f, "linear"),
            ResampleQuality::Fft => write!(f, "fft"),
        }
    }
}

impl FromStr for ResampleQuality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(ResampleQuality::Linear),
            "fft" => Ok(ResampleQuality::Fft),
            other => Err(format!("unknown resampler: {}", other)),
        }
    }
}

/// Returns the frame count after converting `frames` from `src_rate` to `dst_rate`.
///
/// Rounds up so a partial trailing frame is kept.
pub fn output_frames(frames: usize, src_rate: u32, dst_rate: u32) -> usize {
    let num = frames as u64 * dst_rate as u64;
    num.div_ceil(src_rate as u64) as usize
}

/// Converts a buffer to `dst_rate`, keeping its channel count.
///
/// Buffers already at `dst_rate` are returned untouched.
pub fn resample(buffer: AudioBuffer, dst_rate: u32, quality: ResampleQuality) -> Result<AudioBuffer> {
    if buffer.sample_rate() == dst_rate {
        return Ok(buffer);
    }

    tracing::debug!(
        "resampling {} frames from {}Hz to {}Hz ({})",
        buffer.frames(),
        buffer.sample_rate(),
        dst_rate,
        quality
    );

    match quality {
        ResampleQuality::Linear => linear::resample(&buffer, dst_rate),
        ResampleQuality::Fft => rubato_impl::resample(&buffer, dst_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::Format;

    #[test]
    fn test_output_frames() {
        assert_eq!(output_frames(800, 8000, 16000), 1600);
        assert_eq!(output_frames(441, 44100, 48000), 480);
        assert_eq!(output_frames(1, 44100, 48000), 2);
        assert_eq!(output_frames(0, 8000, 16000), 0);
    }

    #[test]
    fn test_same_rate_passthrough() {
        let buf = AudioBuffer::new(Format::mono(8000), vec![1, 2, 3]).unwrap();
        let out = resample(buf.clone(), 8000, ResampleQuality::Fft).unwrap();
        assert_eq!(out, buf);
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!("FFT".parse::<ResampleQuality>().unwrap(), ResampleQuality::Fft);
        assert_eq!("linear".parse::<ResampleQuality>().unwrap(), ResampleQuality::Linear);
        assert!("sinc".parse::<ResampleQuality>().is_err());
    }
}
