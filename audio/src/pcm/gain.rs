//! Decibel gain stage.

use super::buffer::{SAMPLE_MAX, SAMPLE_MIN};
use super::AudioBuffer;

/// Converts a decibel value to a linear multiplier: `10^(db/20)`.
pub fn db_to_linear(decibels: f64) -> f64 {
    10f64.powf(decibels / 20.0)
}

/// Scales one sample, saturating at the 16-bit range and flooring to an integer.
#[inline]
pub fn scale_sample(sample: i16, multiplier: f64) -> i16 {
    (sample as f64 * multiplier)
        .clamp(SAMPLE_MIN as f64, SAMPLE_MAX as f64)
        .floor() as i16
}

/// Applies a decibel gain to every sample of an owned buffer.
///
/// 0 dB returns the buffer untouched.
pub fn apply_gain(mut buffer: AudioBuffer, decibels: f64) -> AudioBuffer {
    if decibels == 0.0 {
        return buffer;
    }

    let multiplier = db_to_linear(decibels);
    for sample in buffer.samples_mut() {
        *sample = scale_sample(*sample, multiplier);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::Format;

    fn ramp() -> AudioBuffer {
        let samples: Vec<i16> = (-50..50).map(|i| i * 97).collect();
        AudioBuffer::new(Format::mono(8000), samples).unwrap()
    }

    #[test]
    fn test_db_to_linear() {
        assert_eq!(db_to_linear(0.0), 1.0);
        assert!((db_to_linear(20.0) - 10.0).abs() < 1e-12);
        assert!((db_to_linear(-6.0) - 0.501187).abs() < 1e-6);
        assert!((db_to_linear(-14.0) - 0.199526).abs() < 1e-6);
    }

    #[test]
    fn test_zero_db_is_identity() {
        let buf = ramp();
        let out = apply_gain(buf.clone(), 0.0);
        assert_eq!(out, buf);
    }

    #[test]
    fn test_gain_is_monotonic() {
        let buf = ramp();
        let quiet = apply_gain(buf.clone(), -12.0);
        let loud = apply_gain(buf.clone(), -3.0);
        for (q, l) in quiet.samples().iter().zip(loud.samples()) {
            assert!(
                (*q as i32).abs() <= (*l as i32).abs(),
                "|{}| should not exceed |{}|",
                q,
                l
            );
        }
    }

    #[test]
    fn test_gain_saturates() {
        let buf = AudioBuffer::new(Format::mono(8000), vec![20000, -20000, 100]).unwrap();
        let out = apply_gain(buf, 12.0);
        assert_eq!(out.samples()[0], SAMPLE_MAX);
        assert_eq!(out.samples()[1], SAMPLE_MIN);
        assert_eq!(out.samples()[2], 398);
    }

    #[test]
    fn test_negative_samples_floor() {
        // -3 * 0.5 = -1.5 floors to -2
        assert_eq!(scale_sample(-3, 0.5), -2);
        assert_eq!(scale_sample(3, 0.5), 1);
    }
}
