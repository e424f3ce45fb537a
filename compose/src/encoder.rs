//! Output encoders.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mixdown_audio::AudioBuffer;
use mixdown_audio::codec::{mp3, wav};

use crate::error::EncodeError;

/// Serializes a final buffer into an output container.
pub trait Encoder: Send + Sync {
    /// Encodes the whole buffer.
    fn encode(&self, buffer: &AudioBuffer) -> Result<Vec<u8>, EncodeError>;

    /// File extension of the produced container, without the dot.
    fn extension(&self) -> &'static str;
}

/// Constant-bitrate MP3 via LAME.
#[derive(Debug, Clone)]
pub struct Mp3Encoder {
    options: mp3::EncoderOptions,
}

impl Mp3Encoder {
    pub fn new(bitrate_kbps: u32) -> Self {
        Self {
            options: mp3::EncoderOptions::default().with_bitrate(bitrate_kbps),
        }
    }
}

impl Default for Mp3Encoder {
    fn default() -> Self {
        Self::new(mp3::DEFAULT_BITRATE_KBPS)
    }
}

impl Encoder for Mp3Encoder {
    fn encode(&self, buffer: &AudioBuffer) -> Result<Vec<u8>, EncodeError> {
        Ok(mp3::encode(buffer, &self.options)?)
    }

    fn extension(&self) -> &'static str {
        "mp3"
    }
}

/// 16-bit PCM WAV.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder;

impl Encoder for WavEncoder {
    fn encode(&self, buffer: &AudioBuffer) -> Result<Vec<u8>, EncodeError> {
        Ok(wav::encode(buffer)?)
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}

/// Output container selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCodec {
    #[default]
    Mp3,
    Wav,
}

impl fmt::Display for OutputCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputCodec::Mp3 => write!(f, "mp3"),
            OutputCodec::Wav => write!(f, "wav"),
        }
    }
}

impl FromStr for OutputCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(OutputCodec::Mp3),
            "wav" => Ok(OutputCodec::Wav),
            other => Err(format!("unknown output codec: {} (expected mp3 or wav)", other)),
        }
    }
}

/// Fixed output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub codec: OutputCodec,
    /// Only used by MP3.
    pub bitrate_kbps: u32,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            codec: OutputCodec::Mp3,
            bitrate_kbps: mp3::DEFAULT_BITRATE_KBPS,
        }
    }
}

/// Builds the encoder for the given options.
pub fn encoder_for(options: &OutputOptions) -> Arc<dyn Encoder> {
    match options.codec {
        OutputCodec::Mp3 => Arc::new(Mp3Encoder::new(options.bitrate_kbps)),
        OutputCodec::Wav => Arc::new(WavEncoder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixdown_audio::Format;

    #[test]
    fn test_codec_parse() {
        assert_eq!("MP3".parse::<OutputCodec>().unwrap(), OutputCodec::Mp3);
        assert_eq!("wav".parse::<OutputCodec>().unwrap(), OutputCodec::Wav);
        assert!("ogg".parse::<OutputCodec>().is_err());
        assert_eq!(OutputCodec::default().to_string(), "mp3");
    }

    #[test]
    fn test_encoder_for() {
        let enc = encoder_for(&OutputOptions::default());
        assert_eq!(enc.extension(), "mp3");

        let enc = encoder_for(&OutputOptions {
            codec: OutputCodec::Wav,
            bitrate_kbps: 0,
        });
        assert_eq!(enc.extension(), "wav");

        let buf = AudioBuffer::new(Format::mono(8000), vec![0; 80]).unwrap();
        let bytes = enc.encode(&buf).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
    }

    #[test]
    fn test_mp3_rejects_surround() {
        let buf = AudioBuffer::silence(Format::new(44100, 6), 10).unwrap();
        assert!(Mp3Encoder::default().encode(&buf).is_err());
    }
}
