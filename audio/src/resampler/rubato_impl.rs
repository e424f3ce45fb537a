//! Rubato-based resampler implementation.
//!
//! Whole buffers are pushed through rubato's `FftFixedIn` in fixed-size
//! chunks, then the resampler's delay is trimmed from the front and the tail
//! is cut to the exact expected frame count.

use rubato::{FftFixedIn, Resampler as RubatoResampler};

use super::output_frames;
use crate::error::Result;
use crate::pcm::{AudioBuffer, Format};

/// Frames fed to rubato per processing block.
const CHUNK_FRAMES: usize = 1024;

/// FFT sub-chunks per block.
const SUB_CHUNKS: usize = 2;

pub(super) fn resample(buffer: &AudioBuffer, dst_rate: u32) -> Result<AudioBuffer> {
    let src = buffer.format();
    let channels = src.channels as usize;
    let in_frames = buffer.frames();
    let expected = output_frames(in_frames, src.sample_rate, dst_rate);
    let dst = Format::new(dst_rate, src.channels);

    if in_frames == 0 {
        return AudioBuffer::new(dst, Vec::new());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        src.sample_rate as usize,
        dst_rate as usize,
        CHUNK_FRAMES,
        SUB_CHUNKS,
        channels,
    )?;
    let delay = resampler.output_delay();

    let planar = deinterleave(buffer);
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); channels];

    let mut pos = 0;
    while pos < in_frames {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(in_frames);
        let block: Vec<&[f32]> = planar.iter().map(|ch| &ch[pos..end]).collect();
        let produced = if end - pos == needed {
            resampler.process(block.as_slice(), None)?
        } else {
            resampler.process_partial(Some(block.as_slice()), None)?
        };
        append(&mut output, produced);
        pos = end;
    }

    // Flush the delay line with silence until the tail is complete.
    while output[0].len() < expected + delay {
        let produced = resampler.process_partial::<Vec<f32>>(None, None)?;
        if produced[0].is_empty() {
            break;
        }
        append(&mut output, produced);
    }

    let mut out = Vec::with_capacity(expected * channels);
    for frame in 0..expected {
        for ch in output.iter() {
            let value = ch.get(frame + delay).copied().unwrap_or(0.0);
            out.push(to_i16(value));
        }
    }

    AudioBuffer::new(dst, out)
}

/// Splits interleaved i16 samples into per-channel f32 planes.
fn deinterleave(buffer: &AudioBuffer) -> Vec<Vec<f32>> {
    let channels = buffer.channels() as usize;
    let mut planes = vec![Vec::with_capacity(buffer.frames()); channels];
    for frame in buffer.samples().chunks_exact(channels) {
        for (plane, &sample) in planes.iter_mut().zip(frame) {
            plane.push(sample as f32 / 32768.0);
        }
    }
    planes
}

fn append(output: &mut [Vec<f32>], produced: Vec<Vec<f32>>) {
    for (dst, src) in output.iter_mut().zip(produced) {
        dst.extend_from_slice(&src);
    }
}

fn to_i16(value: f32) -> i16 {
    (value * 32768.0).round().clamp(-32768.0, 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(format: Format, frames: usize, hz: f32) -> AudioBuffer {
        let channels = format.channels as usize;
        let mut samples = Vec::with_capacity(frames * channels);
        for i in 0..frames {
            let t = i as f32 / format.sample_rate as f32;
            let s = ((t * hz * std::f32::consts::TAU).sin() * 8000.0) as i16;
            for _ in 0..channels {
                samples.push(s);
            }
        }
        AudioBuffer::new(format, samples).unwrap()
    }

    #[test]
    fn test_frame_count_matches_linear() {
        let buf = sine(Format::mono(22050), 5000, 440.0);
        let out = resample(&buf, 44100).unwrap();
        assert_eq!(out.format(), Format::mono(44100));
        assert_eq!(out.frames(), output_frames(5000, 22050, 44100));
    }

    #[test]
    fn test_stereo_downsample() {
        let buf = sine(Format::stereo(48000), 4800, 440.0);
        let out = resample(&buf, 16000).unwrap();
        assert_eq!(out.format(), Format::stereo(16000));
        assert_eq!(out.frames(), 1600);
        // Signal energy survives the conversion.
        let peak = out.samples().iter().map(|s| (*s as i32).abs()).max().unwrap();
        assert!(peak > 6000, "peak {} too low", peak);
    }

    #[test]
    fn test_deterministic() {
        let buf = sine(Format::mono(8000), 3000, 300.0);
        let a = resample(&buf, 16000).unwrap();
        let b = resample(&buf, 16000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_buffer() {
        let buf = AudioBuffer::new(Format::mono(8000), vec![]).unwrap();
        let out = resample(&buf, 16000).unwrap();
        assert!(out.is_empty());
    }
}
