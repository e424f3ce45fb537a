//! Channel layout conversion.

use crate::error::{AudioError, Result};
use crate::pcm::{AudioBuffer, Format};

/// Expands a mono buffer to `channels` by duplicating each sample.
///
/// Multi-channel input is only accepted when it already has `channels`
/// channels; this never downmixes.
pub fn expand_mono(buffer: AudioBuffer, channels: u16) -> Result<AudioBuffer> {
    let src = buffer.format();
    if src.channels == channels {
        return Ok(buffer);
    }
    let dst = Format::new(src.sample_rate, channels);
    if src.channels != 1 || channels == 0 {
        return Err(AudioError::ChannelLayout { a: src, b: dst });
    }

    let width = channels as usize;
    let mut out = Vec::with_capacity(buffer.samples().len() * width);
    for &sample in buffer.samples() {
        out.extend(std::iter::repeat_n(sample, width));
    }
    AudioBuffer::new(dst, out)
}
