//! Linear interpolation resampler.

use super::output_frames;
use crate::error::Result;
use crate::pcm::{AudioBuffer, Format};

/// Resamples every channel independently by linear interpolation.
///
/// The last input frame is held when interpolation would read past the end.
pub(super) fn resample(buffer: &AudioBuffer, dst_rate: u32) -> Result<AudioBuffer> {
    let src = buffer.format();
    let channels = src.channels as usize;
    let in_frames = buffer.frames();
    let out_frames = output_frames(in_frames, src.sample_rate, dst_rate);
    let step = src.sample_rate as f64 / dst_rate as f64;
    let input = buffer.samples();

    let mut out = Vec::with_capacity(out_frames * channels);
    for i in 0..out_frames {
        let src_pos = i as f64 * step;
        let src_idx = (src_pos as usize).min(in_frames.saturating_sub(1));
        let next_idx = (src_idx + 1).min(in_frames - 1);
        let frac = src_pos - src_idx as f64;

        for ch in 0..channels {
            let a = input[src_idx * channels + ch] as f64;
            let b = input[next_idx * channels + ch] as f64;
            let sample = (a + (b - a) * frac).round().clamp(i16::MIN as f64, i16::MAX as f64);
            out.push(sample as i16);
        }
    }

    AudioBuffer::new(Format::new(dst_rate, src.channels), out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsample_interpolates() {
        let buf = AudioBuffer::new(Format::mono(1000), vec![0, 100, 200]).unwrap();
        let out = resample(&buf, 2000).unwrap();
        assert_eq!(out.sample_rate(), 2000);
        assert_eq!(out.samples(), &[0, 50, 100, 150, 200, 200]);
    }

    #[test]
    fn test_downsample_picks_frames() {
        let buf = AudioBuffer::new(Format::mono(2000), vec![0, 10, 20, 30]).unwrap();
        let out = resample(&buf, 1000).unwrap();
        assert_eq!(out.samples(), &[0, 20]);
    }

    #[test]
    fn test_stereo_channels_stay_separate() {
        let buf = AudioBuffer::new(Format::stereo(1000), vec![0, 1000, 100, 900]).unwrap();
        let out = resample(&buf, 2000).unwrap();
        assert_eq!(out.channels(), 2);
        assert_eq!(out.samples(), &[0, 1000, 50, 950, 100, 900, 100, 900]);
    }

    #[test]
    fn test_empty_buffer() {
        let buf = AudioBuffer::new(Format::mono(8000), vec![]).unwrap();
        let out = resample(&buf, 16000).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate(), 16000);
    }
}
