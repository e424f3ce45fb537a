//! Timeline compositor.
//!
//! Builds one output track from a narration clip, sound effects placed at
//! absolute times, and an optional music bed the narration enters after an
//! intro offset:
//!
//! 1. the narration becomes the working mix;
//! 2. each effect is gain-adjusted, reconciled with the mix and overlaid at
//!    its time, truncated to the mix length;
//! 3. the music bed is gain-adjusted and reconciled, and the mix is overlaid
//!    onto it at the intro offset. The output then lasts as long as the music;
//! 4. the result is encoded and delivered as `mixed_<job_id>.<ext>`.
//!
//! All intermediate state lives in a per-job [`Scope`] that is closed on
//! every exit path.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use mixdown_audio::pcm::{DurationPolicy, Reconciler, apply_gain, overlay};
use mixdown_audio::resampler::ResampleQuality;
use mixdown_audio::AudioBuffer;

use crate::encoder::Encoder;
use crate::error::{ClipRef, ComposeError, Result};
use crate::loader::ResourceLoader;
use crate::request::{MixRequest, MixRequestBody, MusicSpec, SfxSpec};
use crate::scope::{Scope, Tracked};

/// Compositor settings.
#[derive(Debug, Clone)]
pub struct CompositorOptions {
    /// Parent of the per-job work directories.
    pub work_root: PathBuf,
    /// Where delivered artifacts are written.
    pub output_dir: PathBuf,
    /// Resampling strategy used when reconciling rates.
    pub resample: ResampleQuality,
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            work_root: std::env::temp_dir(),
            output_dir: PathBuf::from("."),
            resample: ResampleQuality::default(),
        }
    }
}

/// A delivered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    pub job_id: Uuid,
    pub path: PathBuf,
    /// Container extension, e.g. `mp3`.
    pub extension: String,
    /// Size in bytes.
    pub size: u64,
}

impl ArtifactHandle {
    /// Returns the artifact's file name.
    pub fn file_name(&self) -> String {
        format!("mixed_{}.{}", self.job_id, self.extension)
    }
}

/// Outcome of a successful composition.
#[derive(Debug, Clone)]
pub struct MixResult {
    pub job_id: Uuid,
    /// The final mixed buffer.
    pub buffer: AudioBuffer,
    /// Duration of the final buffer in seconds.
    pub duration: f64,
    pub artifact: ArtifactHandle,
}

/// Composes mix requests using a loader and an encoder.
///
/// One compositor may run any number of jobs concurrently. Jobs share no
/// mutable state.
pub struct Compositor {
    loader: Arc<dyn ResourceLoader>,
    encoder: Arc<dyn Encoder>,
    reconciler: Reconciler,
    options: CompositorOptions,
}

impl Compositor {
    /// Creates a compositor.
    pub fn new(
        loader: Arc<dyn ResourceLoader>,
        encoder: Arc<dyn Encoder>,
        options: CompositorOptions,
    ) -> Self {
        Self {
            loader,
            encoder,
            reconciler: Reconciler::new(options.resample),
            options,
        }
    }

    /// Returns the options.
    pub fn options(&self) -> &CompositorOptions {
        &self.options
    }

    /// Validates a wire request and composes it.
    ///
    /// An invalid request fails before any source is fetched.
    pub async fn compose_body(&self, body: &MixRequestBody) -> Result<MixResult> {
        let request = body.validate()?;
        self.compose(request).await
    }

    /// Runs one job in a fresh scope.
    ///
    /// An invalid request fails before the scope opens. The scope is closed
    /// whether the job succeeds or fails; release failures are logged and
    /// never replace the job's own outcome.
    pub async fn compose(&self, request: MixRequest) -> Result<MixResult> {
        request.check()?;
        let mut scope = Scope::new(&self.options.work_root)
            .map_err(|e| ComposeError::Mix(format!("failed to create work dir: {}", e)))?;
        let span = info_span!("compose", job_id = %scope.job_id());

        let started = Instant::now();
        let result = self.compose_in(&request, &scope).instrument(span.clone()).await;

        let report = scope.close();
        span.in_scope(|| {
            if !report.is_clean() {
                warn!("{} resource(s) failed to release", report.failures.len());
            }
            match &result {
                Ok(mix) => info!(
                    "mixed {:.3}s into {} in {:?}",
                    mix.duration,
                    mix.artifact.path.display(),
                    started.elapsed()
                ),
                Err(e) => warn!("compose failed: {}", e),
            }
        });
        result
    }

    /// Runs the pipeline inside a caller-provided scope.
    ///
    /// Everything registered here is released before returning, except the
    /// delivered artifact.
    pub async fn compose_in(&self, request: &MixRequest, scope: &Scope) -> Result<MixResult> {
        request.check()?;
        let mut combined = self
            .acquire(scope, &request.narration, ClipRef::Narration)
            .await?;
        debug!(
            "narration {} {:.3}s",
            combined.format(),
            combined.duration_secs()
        );

        for sfx in &request.sfx {
            combined = self.place_sfx(scope, combined, sfx).await?;
        }

        if let Some(music) = &request.music {
            combined = self.lay_over_music(scope, combined, music).await?;
        }

        self.deliver(scope, combined.into_inner())
    }

    async fn place_sfx(
        &self,
        scope: &Scope,
        combined: Tracked<AudioBuffer>,
        sfx: &SfxSpec,
    ) -> Result<Tracked<AudioBuffer>> {
        let fx = self
            .acquire(scope, &sfx.source, ClipRef::Sfx(sfx.index))
            .await?
            .map(|b| apply_gain(b, sfx.gain_db));
        let (combined, fx) = self.reconcile_pair(combined, fx)?;

        debug!(
            "sfx[{}] at {:.3}s gain {} dB",
            sfx.index, sfx.time_secs, sfx.gain_db
        );
        let combined = combined.try_map(|base| {
            overlay(&base, &fx, sfx.position_ms(), DurationPolicy::Truncate)
        })?;
        drop(fx);
        Ok(combined)
    }

    async fn lay_over_music(
        &self,
        scope: &Scope,
        combined: Tracked<AudioBuffer>,
        music: &MusicSpec,
    ) -> Result<Tracked<AudioBuffer>> {
        let bed = self
            .acquire(scope, &music.source, ClipRef::Music)
            .await?
            .map(|b| apply_gain(b, music.gain_db));
        let (bed, combined) = self.reconcile_pair(bed, combined)?;

        debug!(
            "music {:.3}s gain {} dB intro {:.3}s",
            bed.duration_secs(),
            music.gain_db,
            music.intro_secs
        );
        // Output length follows the music bed; a narration running past it is cut.
        let mixed = bed.try_map(|bed| {
            overlay(&bed, &combined, music.intro_ms(), DurationPolicy::Truncate)
        })?;
        drop(combined);
        Ok(mixed)
    }

    fn deliver(&self, scope: &Scope, buffer: AudioBuffer) -> Result<MixResult> {
        let job_id = scope.job_id();
        let bytes = self.encoder.encode(&buffer)?;
        let extension = self.encoder.extension();

        let staged = scope.temp_file(extension);
        std::fs::write(staged.path(), &bytes)
            .map_err(|e| ComposeError::Encode(format!("failed to write output: {}", e)))?;

        let file_name = format!("mixed_{}.{}", job_id, extension);
        let path = scope
            .promote(staged, &self.options.output_dir, &file_name)
            .map_err(|e| ComposeError::Encode(format!("failed to deliver output: {}", e)))?;

        Ok(MixResult {
            job_id,
            duration: buffer.duration_secs(),
            buffer,
            artifact: ArtifactHandle {
                job_id,
                path,
                extension: extension.to_string(),
                size: bytes.len() as u64,
            },
        })
    }

    async fn acquire(
        &self,
        scope: &Scope,
        source: &str,
        clip: ClipRef,
    ) -> Result<Tracked<AudioBuffer>> {
        debug!("loading {} from {}", clip, source);
        let buffer = self
            .loader
            .load(source, scope)
            .await
            .map_err(|e| e.for_clip(clip))?;
        Ok(scope.track(clip.to_string(), buffer))
    }

    fn reconcile_pair(
        &self,
        a: Tracked<AudioBuffer>,
        b: Tracked<AudioBuffer>,
    ) -> Result<(Tracked<AudioBuffer>, Tracked<AudioBuffer>)> {
        let (a, a_lease) = a.into_parts();
        let (b, b_lease) = b.into_parts();
        let (a, b) = self.reconciler.reconcile(a, b)?;
        Ok((Tracked::from_parts(a, a_lease), Tracked::from_parts(b, b_lease)))
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("encoder", &self.encoder.extension())
            .field("reconciler", &self.reconciler)
            .field("options", &self.options)
            .finish()
    }
}
