//! PCM (Pulse Code Modulation) buffers and the sample-level mixing stages.
//!
//! # Key Types
//!
//! - [`Format`]: sample rate and channel count of 16-bit interleaved PCM
//! - [`AudioBuffer`]: an owned, decoded PCM buffer
//! - [`Reconciler`]: brings two buffers to a common format
//! - [`DurationPolicy`]: how an overlay affects the output length
//!
//! # Example
//!
//! ```rust
//! use mixdown_audio::pcm::{apply_gain, overlay, AudioBuffer, DurationPolicy, Format};
//!
//! let fmt = Format::mono(8000);
//! let voice = AudioBuffer::new(fmt, vec![1000; 8000]).unwrap();
//! let click = apply_gain(AudioBuffer::new(fmt, vec![1000; 800]).unwrap(), -6.0);
//!
//! let mixed = overlay(&voice, &click, 500.0, DurationPolicy::Truncate).unwrap();
//! assert_eq!(mixed.duration_secs(), 1.0);
//! ```

mod buffer;
mod format;
mod gain;
mod overlay;
mod reconcile;

pub use buffer::{clamp_sample, mix_sample, AudioBuffer, SAMPLE_MAX, SAMPLE_MIN};
pub use format::Format;
pub use gain::{apply_gain, db_to_linear, scale_sample};
pub use overlay::{overlay, DurationPolicy};
pub use reconcile::{target_format, Reconciler};
