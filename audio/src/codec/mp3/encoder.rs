//! MP3 encoder using LAME.

use mp3lame_encoder::{Bitrate, Builder, DualPcm, FlushNoGap, Quality};

use crate::error::{AudioError, Result};
use crate::pcm::AudioBuffer;

/// Default constant bitrate in kbps.
pub const DEFAULT_BITRATE_KBPS: u32 = 192;

/// MP3 encoder options.
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// Constant bitrate in kbps. Snapped down to the nearest LAME bitrate.
    pub bitrate_kbps: u32,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
        }
    }
}

impl EncoderOptions {
    /// Sets the constant bitrate (in kbps).
    pub fn with_bitrate(mut self, kbps: u32) -> Self {
        self.bitrate_kbps = kbps;
        self
    }
}

/// Maps a kbps value to the LAME bitrate at or below it.
fn lame_bitrate(kbps: u32) -> Bitrate {
    match kbps {
        0..=111 => Bitrate::Kbps96,
        112..=127 => Bitrate::Kbps112,
        128..=159 => Bitrate::Kbps128,
        160..=191 => Bitrate::Kbps160,
        192..=223 => Bitrate::Kbps192,
        224..=255 => Bitrate::Kbps224,
        256..=319 => Bitrate::Kbps256,
        _ => Bitrate::Kbps320,
    }
}

/// Encodes a whole buffer to an MP3 byte stream.
///
/// Mono and stereo buffers are supported.
pub fn encode(buffer: &AudioBuffer, options: &EncoderOptions) -> Result<Vec<u8>> {
    let channels = buffer.channels();
    if channels != 1 && channels != 2 {
        return Err(AudioError::Encode(format!(
            "mp3: channels must be 1 or 2, got {}",
            channels
        )));
    }

    let mut builder =
        Builder::new().ok_or_else(|| AudioError::Encode("mp3: failed to initialize LAME".into()))?;
    builder
        .set_num_channels(channels as u8)
        .map_err(|e| AudioError::Encode(format!("mp3: set channels: {:?}", e)))?;
    builder
        .set_sample_rate(buffer.sample_rate())
        .map_err(|e| AudioError::Encode(format!("mp3: set sample rate: {:?}", e)))?;
    builder
        .set_brate(lame_bitrate(options.bitrate_kbps))
        .map_err(|e| AudioError::Encode(format!("mp3: set bitrate: {:?}", e)))?;
    builder
        .set_quality(Quality::Best)
        .map_err(|e| AudioError::Encode(format!("mp3: set quality: {:?}", e)))?;
    let mut encoder = builder
        .build()
        .map_err(|e| AudioError::Encode(format!("mp3: build: {:?}", e)))?;

    // LAME takes separate planes; mono feeds the same plane twice.
    let frames = buffer.frames();
    let (left, right): (Vec<i16>, Vec<i16>) = if channels == 2 {
        buffer.samples().chunks_exact(2).map(|f| (f[0], f[1])).unzip()
    } else {
        (buffer.samples().to_vec(), buffer.samples().to_vec())
    };

    let mut mp3 = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(frames));
    let input = DualPcm {
        left: &left,
        right: &right,
    };
    let written = encoder
        .encode(input, mp3.spare_capacity_mut())
        .map_err(|e| AudioError::Encode(format!("mp3: encode: {:?}", e)))?;
    // SAFETY: the encoder initialized `written` bytes of spare capacity.
    unsafe {
        mp3.set_len(written);
    }

    mp3.reserve(7200);
    let flushed = encoder
        .flush::<FlushNoGap>(mp3.spare_capacity_mut())
        .map_err(|e| AudioError::Encode(format!("mp3: flush: {:?}", e)))?;
    // SAFETY: the flush initialized `flushed` bytes past the current length.
    unsafe {
        mp3.set_len(mp3.len() + flushed);
    }

    Ok(mp3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::Format;

    fn tone(format: Format, frames: usize) -> AudioBuffer {
        let channels = format.channels as usize;
        let samples = (0..frames)
            .flat_map(|i| {
                let s = ((i as f32 * 0.05).sin() * 6000.0) as i16;
                std::iter::repeat_n(s, channels)
            })
            .collect();
        AudioBuffer::new(format, samples).unwrap()
    }

    fn looks_like_mp3(bytes: &[u8]) -> bool {
        bytes.starts_with(b"ID3") || (bytes.len() > 1 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
    }

    #[test]
    fn test_encode_stereo() {
        let buf = tone(Format::STEREO_44K, 22050);
        let mp3 = encode(&buf, &EncoderOptions::default()).unwrap();
        assert!(!mp3.is_empty());
        assert!(looks_like_mp3(&mp3));
    }

    #[test]
    fn test_encode_mono() {
        let buf = tone(Format::MONO_44K, 22050);
        let mp3 = encode(&buf, &EncoderOptions::default().with_bitrate(128)).unwrap();
        assert!(looks_like_mp3(&mp3));
    }

    #[test]
    fn test_rejects_surround() {
        let buf = AudioBuffer::silence(Format::new(44100, 6), 100).unwrap();
        assert!(matches!(
            encode(&buf, &EncoderOptions::default()),
            Err(AudioError::Encode(_))
        ));
    }

    #[test]
    fn test_lame_bitrate_snaps_down() {
        assert!(matches!(lame_bitrate(192), Bitrate::Kbps192));
        assert!(matches!(lame_bitrate(200), Bitrate::Kbps192));
        assert!(matches!(lame_bitrate(64), Bitrate::Kbps96));
        assert!(matches!(lame_bitrate(999), Bitrate::Kbps320));
    }
}
