//! Audio codec implementations.
//!
//! - `decode`: any container/codec symphonia understands, to PCM
//! - `mp3`: constant-bitrate MP3 encoding (LAME)
//! - `wav`: 16-bit PCM WAV encoding (hound)

pub mod decode;
pub mod mp3;
pub mod wav;

pub use decode::{decode_bytes, decode_file};
