//! PCM audio format definitions.

use std::fmt;
use std::time::Duration;

/// Describes a signed 16-bit interleaved PCM layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Format {
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

impl Format {
    /// Creates a new format.
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Creates a mono format with the given sample rate.
    pub const fn mono(sample_rate: u32) -> Self {
        Self::new(sample_rate, 1)
    }

    /// Creates a stereo format with the given sample rate.
    pub const fn stereo(sample_rate: u32) -> Self {
        Self::new(sample_rate, 2)
    }

    /// Returns true if both the sample rate and channel count are non-zero.
    pub fn is_valid(&self) -> bool {
        self.sample_rate > 0 && self.channels > 0
    }

    /// Returns the number of bytes per sample frame.
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * 2
    }

    /// Returns the number of interleaved samples per second.
    pub fn samples_per_second(&self) -> u64 {
        self.sample_rate as u64 * self.channels as u64
    }

    /// Returns the number of whole frames in the given duration.
    pub fn frames_in_duration(&self, duration: Duration) -> usize {
        (duration.as_nanos() * self.sample_rate as u128 / 1_000_000_000) as usize
    }

    /// Returns the frame index a time offset in milliseconds falls on.
    ///
    /// Fractional milliseconds are kept; the result is floored to the frame
    /// that contains the offset.
    pub fn frames_at_millis(&self, millis: f64) -> usize {
        (millis * self.sample_rate as f64 / 1000.0).floor() as usize
    }

    /// Returns the duration of the given number of frames.
    pub fn duration_of_frames(&self, frames: usize) -> Duration {
        Duration::from_secs_f64(frames as f64 / self.sample_rate as f64)
    }
}

// Common format presets
impl Format {
    /// 16kHz mono (common for TTS)
    pub const MONO_16K: Format = Format::mono(16000);
    /// 22.05kHz mono
    pub const MONO_22K: Format = Format::mono(22050);
    /// 44.1kHz mono
    pub const MONO_44K: Format = Format::mono(44100);
    /// 44.1kHz stereo (CD quality)
    pub const STEREO_44K: Format = Format::stereo(44100);
    /// 48kHz stereo
    pub const STEREO_48K: Format = Format::stereo(48000);
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz/{}ch", self.sample_rate, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_properties() {
        let fmt = Format::STEREO_44K;
        assert_eq!(fmt.sample_rate, 44100);
        assert_eq!(fmt.channels, 2);
        assert_eq!(fmt.frame_bytes(), 4);
        assert_eq!(fmt.samples_per_second(), 88200);
        assert!(fmt.is_valid());
        assert!(!Format::new(0, 1).is_valid());
        assert!(!Format::new(8000, 0).is_valid());
    }

    #[test]
    fn test_frames_in_duration() {
        let fmt = Format::MONO_16K;
        assert_eq!(fmt.frames_in_duration(Duration::from_secs(1)), 16000);
        assert_eq!(fmt.frames_in_duration(Duration::from_millis(100)), 1600);
    }

    #[test]
    fn test_frames_at_millis() {
        let fmt = Format::mono(8000);
        assert_eq!(fmt.frames_at_millis(0.0), 0);
        assert_eq!(fmt.frames_at_millis(2000.0), 16000);
        assert_eq!(fmt.frames_at_millis(4500.0), 36000);
        // 0.0625ms is half a frame at 8kHz
        assert_eq!(fmt.frames_at_millis(0.0625), 0);
        assert_eq!(fmt.frames_at_millis(0.125), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Format::STEREO_48K.to_string(), "48000Hz/2ch");
    }
}
