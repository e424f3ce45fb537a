//! MP3 audio codec.
//!
//! This module provides constant-bitrate MP3 encoding using LAME.

mod encoder;

pub use encoder::*;
