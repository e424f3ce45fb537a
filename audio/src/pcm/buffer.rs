//! In-memory PCM buffers.

use std::time::Duration;

use super::Format;
use crate::error::{AudioError, Result};

/// Smallest representable sample value.
pub const SAMPLE_MIN: i16 = i16::MIN;
/// Largest representable sample value.
pub const SAMPLE_MAX: i16 = i16::MAX;

/// Saturates a widened sample into the signed 16-bit range.
#[inline]
pub fn clamp_sample(value: i32) -> i16 {
    value.clamp(SAMPLE_MIN as i32, SAMPLE_MAX as i32) as i16
}

/// Adds two samples with a saturating clamp.
#[inline]
pub fn mix_sample(a: i16, b: i16) -> i16 {
    clamp_sample(a as i32 + b as i32)
}

/// A decoded, interleaved signed 16-bit PCM buffer.
///
/// The duration is always derived from the sample count and format, never
/// stored on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    format: Format,
    samples: Vec<i16>,
}

impl AudioBuffer {
    /// Creates a buffer from interleaved samples.
    ///
    /// Fails if the format is invalid or the samples do not form whole frames.
    pub fn new(format: Format, samples: Vec<i16>) -> Result<Self> {
        if !format.is_valid() {
            return Err(AudioError::InvalidFormat(format));
        }
        if samples.len() % format.channels as usize != 0 {
            return Err(AudioError::Misaligned {
                len: samples.len(),
                channels: format.channels,
            });
        }
        Ok(Self { format, samples })
    }

    /// Creates a buffer of silence lasting the given number of frames.
    pub fn silence(format: Format, frames: usize) -> Result<Self> {
        Self::new(format, vec![0; frames * format.channels as usize])
    }

    /// Returns the format of this buffer.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }

    /// Returns the channel count.
    pub fn channels(&self) -> u16 {
        self.format.channels
    }

    /// Returns the interleaved samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Returns the interleaved samples mutably.
    ///
    /// The length cannot change through this slice, so frame alignment holds.
    pub fn samples_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }

    /// Consumes the buffer and returns the interleaved samples.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    /// Returns the number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.format.channels as usize
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the duration in seconds: samples / (rate x channels).
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.format.samples_per_second() as f64
    }

    /// Returns the duration.
    pub fn duration(&self) -> Duration {
        self.format.duration_of_frames(self.frames())
    }

    /// Returns the samples of the frame range `[start, end)`, clamped to the buffer.
    pub fn frame_slice(&self, start: usize, end: usize) -> &[i16] {
        let channels = self.format.channels as usize;
        let end = end.min(self.frames());
        let start = start.min(end);
        &self.samples[start * channels..end * channels]
    }
}
