//! Audio processing utilities for the mixdown compositor.
//!
//! This crate provides:
//!
//! - `pcm`: PCM buffers, decibel gain, overlay with duration policies and
//!   track reconciliation
//! - `resampler`: sample rate and channel conversion
//! - `codec`: decoding via symphonia, MP3 (LAME) and WAV (hound) encoding
//!
//! # Example
//!
//! ```rust
//! use mixdown_audio::pcm::{AudioBuffer, Format, Reconciler};
//!
//! let narration = AudioBuffer::silence(Format::mono(22050), 22050).unwrap();
//! let music = AudioBuffer::silence(Format::stereo(44100), 44100).unwrap();
//!
//! let (narration, music) = Reconciler::default().reconcile(narration, music).unwrap();
//! assert_eq!(narration.format(), music.format());
//! ```

pub mod codec;
pub mod error;
pub mod pcm;
pub mod resampler;

pub use error::{AudioError, Result};
pub use pcm::{AudioBuffer, Format};
