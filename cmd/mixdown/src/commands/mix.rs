//! Mix command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use mixdown_audio::resampler::ResampleQuality;
use mixdown_cli::{Config, load_request};
use mixdown_compose::request::{MusicSettingsBody, Numeric, SfxBody};
use mixdown_compose::{
    Compositor, HttpLoader, MixRequestBody, MixResponse, OutputCodec, encoder_for,
};

use super::{format_bytes, get_config, output_for, print_success, print_verbose};
use crate::Cli;

/// Mix a narration track with sound effects and background music.
///
/// The request comes from `-f <file>` (YAML or JSON with `narration_url`,
/// `sfx_list`, `music_url` and `music_settings`), from the flags below, or
/// both; flags override the file.
#[derive(Args)]
pub struct MixCommand {
    /// Narration source URL
    #[arg(long)]
    narration: Option<String>,

    /// Sound effect as URL@SECONDS or URL@SECONDS@DB (repeatable)
    #[arg(long = "sfx", value_name = "SPEC")]
    sfx: Vec<String>,

    /// Background music source URL
    #[arg(long)]
    music: Option<String>,

    /// Music gain in dB (default -14)
    #[arg(long, allow_hyphen_values = true)]
    music_volume: Option<f64>,

    /// Seconds of music before the narration enters (default 2)
    #[arg(long)]
    intro: Option<f64>,

    /// Output codec: mp3 or wav
    #[arg(long)]
    codec: Option<OutputCodec>,

    /// MP3 bitrate in kbps
    #[arg(long)]
    bitrate: Option<u32>,

    /// Directory for the mixed file
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Directory for per-job scratch files
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Resampler: linear or fft
    #[arg(long)]
    resampler: Option<ResampleQuality>,

    /// Accept local file paths and file:// URLs as sources
    #[arg(long)]
    allow_local_files: bool,
}

impl MixCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut cfg = get_config(cli)?;
        self.apply_overrides(&mut cfg);

        let body = self.build_request(cli)?;
        print_verbose(cli, &format!("Config: {}", cfg.path().display()));
        print_verbose(
            cli,
            &format!(
                "Output: {} ({} kbps) -> {}",
                cfg.output.codec,
                cfg.output.bitrate_kbps,
                cfg.output_dir().display()
            ),
        );

        let loader = Arc::new(HttpLoader::new(cfg.loader_options())?);
        let encoder = encoder_for(&cfg.output_options());
        let compositor = Compositor::new(loader, encoder, cfg.compositor_options());

        let result = compositor.compose_body(&body).await;
        let response = MixResponse::from_result(&result, cfg.output.public_base_url.as_deref());
        output_for(cli).write(&response)?;

        match result {
            Ok(mix) => {
                print_success(&format!(
                    "Mixed {:.2}s ({}) to {}",
                    mix.duration,
                    format_bytes(mix.artifact.size),
                    mix.artifact.path.display()
                ));
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(codec) = self.codec {
            cfg.output.codec = codec;
        }
        if let Some(bitrate) = self.bitrate {
            cfg.output.bitrate_kbps = bitrate;
        }
        if let Some(dir) = &self.out_dir {
            cfg.output.dir = Some(dir.clone());
        }
        if let Some(dir) = &self.work_dir {
            cfg.work_dir = Some(dir.clone());
        }
        if let Some(timeout) = self.timeout {
            cfg.fetch.timeout_secs = timeout;
        }
        if let Some(resampler) = self.resampler {
            cfg.resampler = resampler;
        }
        if self.allow_local_files {
            cfg.fetch.allow_local_files = true;
        }
    }

    fn build_request(&self, cli: &Cli) -> anyhow::Result<MixRequestBody> {
        let mut body: MixRequestBody = match cli.input.as_deref() {
            Some(path) => load_request(path)?,
            None => MixRequestBody::default(),
        };

        if let Some(narration) = &self.narration {
            body.narration_url = Some(narration.clone());
        }
        if !self.sfx.is_empty() {
            let list = body.sfx_list.get_or_insert_with(Vec::new);
            for spec in &self.sfx {
                list.push(parse_sfx(spec)?);
            }
        }
        if let Some(music) = &self.music {
            body.music_url = Some(music.clone());
        }
        if self.music_volume.is_some() || self.intro.is_some() {
            let settings = body
                .music_settings
                .get_or_insert_with(MusicSettingsBody::default);
            if let Some(db) = self.music_volume {
                settings.volume_db = Some(Numeric::Number(db));
            }
            if let Some(intro) = self.intro {
                settings.intro_time = Some(Numeric::Number(intro));
            }
        }

        Ok(body)
    }
}

/// Parses `URL@SECONDS` or `URL@SECONDS@DB`.
fn parse_sfx(spec: &str) -> anyhow::Result<SfxBody> {
    let bad = || anyhow::anyhow!("invalid sfx '{}': expected URL@SECONDS[@DB]", spec);

    let (head, last) = spec.rsplit_once('@').ok_or_else(bad)?;
    let last: f64 = last.parse().map_err(|_| bad())?;

    let (url, time, volume) = match head.rsplit_once('@') {
        Some((url, mid)) => match mid.parse::<f64>() {
            Ok(time) => (url, time, Some(last)),
            Err(_) => (head, last, None),
        },
        None => (head, last, None),
    };
    if url.is_empty() {
        return Err(bad());
    }

    Ok(SfxBody {
        url: Some(url.to_string()),
        time: Some(Numeric::Number(time)),
        volume: volume.map(Numeric::Number),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sfx() {
        let sfx = parse_sfx("https://cdn.example.com/ding.mp3@1.5").unwrap();
        assert_eq!(sfx.url.as_deref(), Some("https://cdn.example.com/ding.mp3"));
        assert_eq!(sfx.time, Some(Numeric::Number(1.5)));
        assert_eq!(sfx.volume, None);

        let sfx = parse_sfx("ding.wav@2@-6").unwrap();
        assert_eq!(sfx.url.as_deref(), Some("ding.wav"));
        assert_eq!(sfx.time, Some(Numeric::Number(2.0)));
        assert_eq!(sfx.volume, Some(Numeric::Number(-6.0)));

        // '@' inside the URL is kept.
        let sfx = parse_sfx("https://user@host/a.mp3@3").unwrap();
        assert_eq!(sfx.url.as_deref(), Some("https://user@host/a.mp3"));
    }

    #[test]
    fn test_parse_sfx_invalid() {
        assert!(parse_sfx("ding.wav").is_err());
        assert!(parse_sfx("ding.wav@soon").is_err());
        assert!(parse_sfx("@1").is_err());
    }
}
