//! Overlay engine: places one buffer onto another at a time offset.

use super::buffer::mix_sample;
use super::AudioBuffer;
use crate::error::{AudioError, Result};

/// How the output length relates to the base and the placed overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Output length equals the base length; overlay content past it is dropped.
    Truncate,
    /// Output grows to `max(base, position + overlay)`, padding the base with silence.
    Extend,
}

/// Mixes `overlay` onto `base` starting at `position_ms`.
///
/// Samples are summed with a saturating clamp. Base samples outside the
/// placed range are copied unchanged. Both buffers must share a format.
pub fn overlay(
    base: &AudioBuffer,
    overlay: &AudioBuffer,
    position_ms: f64,
    policy: DurationPolicy,
) -> Result<AudioBuffer> {
    if base.format() != overlay.format() {
        return Err(AudioError::FormatMismatch {
            base: base.format(),
            overlay: overlay.format(),
        });
    }
    if !position_ms.is_finite() || position_ms < 0.0 {
        return Err(AudioError::InvalidPosition(position_ms));
    }

    let format = base.format();
    let channels = format.channels as usize;
    let offset = format.frames_at_millis(position_ms);

    let out_frames = match policy {
        DurationPolicy::Truncate => base.frames(),
        DurationPolicy::Extend => base.frames().max(offset.saturating_add(overlay.frames())),
    };

    let mut mixed = Vec::with_capacity(out_frames * channels);
    mixed.extend_from_slice(base.samples());
    mixed.resize(out_frames * channels, 0);

    if offset < out_frames {
        let placed = (out_frames - offset).min(overlay.frames());
        let start = offset * channels;
        let end = start + placed * channels;
        for (dst, src) in mixed[start..end].iter_mut().zip(overlay.samples()) {
            *dst = mix_sample(*dst, *src);
        }
    }

    AudioBuffer::new(format, mixed)
}
