//! Decoding of compressed or container audio into PCM using symphonia.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{AudioError, Result};
use crate::pcm::{AudioBuffer, Format};

/// Decodes an audio file. The extension, if any, is used as a probe hint.
pub fn decode_file(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path)?;
    let ext = path.extension().and_then(|e| e.to_str());
    decode_source(Box::new(file), ext)
}

/// Decodes an in-memory audio file.
pub fn decode_bytes(bytes: Vec<u8>, ext_hint: Option<&str>) -> Result<AudioBuffer> {
    decode_source(Box::new(Cursor::new(bytes)), ext_hint)
}

fn decode_source(source: Box<dyn MediaSource>, ext_hint: Option<&str>) -> Result<AudioBuffer> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = ext_hint {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::Decode(format!("unrecognized audio format: {}", e)))?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no audio track found".into()))?;
    let track_id = track.id;
    // Used when the stream holds no frames at all.
    let declared = match (track.codec_params.sample_rate, track.codec_params.channels) {
        (Some(rate), Some(channels)) => Some(Format::new(rate, channels.count() as u16)),
        _ => None,
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(format!("unsupported codec: {}", e)))?;

    let mut format: Option<Format> = None;
    let mut samples: Vec<i16> = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let packet_format = Format::new(spec.rate, spec.channels.count() as u16);
                match format {
                    None => format = Some(packet_format),
                    Some(f) if f != packet_format => {
                        return Err(AudioError::Decode(format!(
                            "stream changed format mid-way: {} -> {}",
                            f, packet_format
                        )));
                    }
                    Some(_) => {}
                }
                if decoded.frames() == 0 {
                    continue;
                }
                let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                debug!("skipping undecodable packet: {}", msg);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let format = format
        .or(declared)
        .ok_or_else(|| AudioError::Decode("no audio frames decoded".into()))?;
    if samples.is_empty() {
        debug!("decoded an empty {} stream", format);
    }
    AudioBuffer::new(format, samples)
}
