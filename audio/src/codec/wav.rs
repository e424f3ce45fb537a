//! WAV encoding via hound.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::Result;
use crate::pcm::AudioBuffer;

/// Encodes a buffer as a 16-bit PCM WAV file.
pub fn encode(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec)?;
    for &sample in buffer.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::Format;

    #[test]
    fn test_wav_roundtrip_through_hound() {
        let buf = AudioBuffer::new(Format::stereo(22050), vec![1, -1, 32767, -32768]).unwrap();
        let bytes = encode(&buf).unwrap();
        assert!(bytes.starts_with(b"RIFF"));

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 22050);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, buf.samples());
    }
}
