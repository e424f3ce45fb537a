//! Audio timeline compositor.
//!
//! Mixes a narration clip, sound effects placed at absolute times and an
//! optional background music bed into one encoded output file.
//!
//! # Modules
//!
//! - `request`: wire request shape and validation
//! - `compositor`: the pipeline
//! - `scope`: per-job resource tracking and cleanup
//! - `loader`: the [`ResourceLoader`] trait and an HTTP/file implementation
//! - `encoder`: the [`Encoder`] trait with MP3 and WAV implementations
//! - `response`: serializable job outcome
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mixdown_compose::{
//!     Compositor, CompositorOptions, HttpLoader, LoaderOptions, MixRequest, MusicSpec,
//!     Mp3Encoder,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = Arc::new(HttpLoader::new(LoaderOptions::default())?);
//! let compositor = Compositor::new(loader, Arc::new(Mp3Encoder::default()), CompositorOptions::default());
//!
//! let request = MixRequest::new("https://cdn.example.com/voice.mp3")?
//!     .with_sfx("https://cdn.example.com/door.mp3", 1.5, -3.0)
//!     .with_music(MusicSpec::new("https://cdn.example.com/bed.mp3"));
//!
//! let result = compositor.compose(request).await?;
//! println!("{} ({:.2}s)", result.artifact.path.display(), result.duration);
//! # Ok(())
//! # }
//! ```

pub mod compositor;
pub mod encoder;
pub mod error;
pub mod loader;
pub mod request;
pub mod response;
pub mod scope;

pub use compositor::{ArtifactHandle, Compositor, CompositorOptions, MixResult};
pub use encoder::{Encoder, Mp3Encoder, OutputCodec, OutputOptions, WavEncoder, encoder_for};
pub use error::{ClipRef, ComposeError, EncodeError, ErrorCategory, LoadError, Result};
pub use loader::{HttpLoader, LoaderOptions, ResourceLoader};
pub use request::{MixRequest, MixRequestBody, MusicSpec, SfxSpec};
pub use response::MixResponse;
pub use scope::{ReleaseReport, Scope, Tracked};
