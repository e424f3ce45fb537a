//! Track reconciliation: bringing two buffers to a common format.

use tracing::debug;

use super::{AudioBuffer, Format};
use crate::error::{AudioError, Result};
use crate::resampler::{self, ResampleQuality};

/// Returns the format two buffers must share before sample-level mixing.
///
/// The higher sample rate wins. A mono side is widened to the other side's
/// channel count; two different multi-channel layouts are rejected.
pub fn target_format(a: Format, b: Format) -> Result<Format> {
    let channels = if a.channels == b.channels || b.channels == 1 {
        a.channels
    } else if a.channels == 1 {
        b.channels
    } else {
        return Err(AudioError::ChannelLayout { a, b });
    };
    Ok(Format::new(a.sample_rate.max(b.sample_rate), channels))
}

/// Normalizes pairs of buffers to a shared sample rate and channel count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    quality: ResampleQuality,
}

impl Reconciler {
    /// Creates a reconciler using the given resampling strategy.
    pub fn new(quality: ResampleQuality) -> Self {
        Self { quality }
    }

    /// Returns the resampling strategy.
    pub fn quality(&self) -> ResampleQuality {
        self.quality
    }

    /// Converts both buffers to their common target format.
    ///
    /// A buffer already in the target format is passed through untouched.
    pub fn reconcile(&self, a: AudioBuffer, b: AudioBuffer) -> Result<(AudioBuffer, AudioBuffer)> {
        let target = target_format(a.format(), b.format())?;
        if a.format() != target || b.format() != target {
            debug!("reconciling {} and {} to {}", a.format(), b.format(), target);
        }
        let a = self.conform(a, target)?;
        let b = self.conform(b, target)?;
        Ok((a, b))
    }

    /// Converts one buffer to `target`.
    pub fn conform(&self, buffer: AudioBuffer, target: Format) -> Result<AudioBuffer> {
        if buffer.format() == target {
            return Ok(buffer);
        }
        let buffer = resampler::resample(buffer, target.sample_rate, self.quality)?;
        resampler::expand_mono(buffer, target.channels)
    }
}
