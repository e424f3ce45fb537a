//! Configuration management for CLI tools.
//!
//! Configuration is stored in ~/.mixdown/{app_name}/config.yaml and created
//! with defaults on first use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use mixdown_audio::codec::mp3::DEFAULT_BITRATE_KBPS;
use mixdown_audio::resampler::ResampleQuality;
use mixdown_compose::loader::DEFAULT_TIMEOUT_SECS;
use mixdown_compose::{CompositorOptions, LoaderOptions, OutputCodec, OutputOptions};

use crate::paths::Paths;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    /// Parent of per-job work directories. System temp dir if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,

    /// Resampling strategy (`linear` or `fft`).
    #[serde(default)]
    pub resampler: ResampleQuality,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub codec: OutputCodec,

    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,

    /// Directory mixed files are written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// When set, results report `<base>/download/<file>` instead of a path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            codec: OutputCodec::default(),
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            dir: None,
            public_base_url: None,
        }
    }
}

/// Source fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept `file://` URLs and plain paths as sources.
    #[serde(default)]
    pub allow_local_files: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            allow_local_files: false,
        }
    }
}

fn default_bitrate() -> u32 {
    DEFAULT_BITRATE_KBPS
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Paths::new(app_name).ok().map(|p| p.config_file())
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Output directory: configured value, else the app's output dir, else `.`.
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .dir
            .clone()
            .or_else(|| Paths::new(&self.app_name).ok().map(|p| p.output_dir()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Encoder settings.
    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            codec: self.output.codec,
            bitrate_kbps: self.output.bitrate_kbps,
        }
    }

    /// Loader settings.
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            timeout: Duration::from_secs(self.fetch.timeout_secs),
            allow_local_files: self.fetch.allow_local_files,
        }
    }

    /// Compositor settings.
    pub fn compositor_options(&self) -> CompositorOptions {
        CompositorOptions {
            work_root: self.work_dir.clone().unwrap_or_else(std::env::temp_dir),
            output_dir: self.output_dir(),
            resample: self.resampler,
        }
    }
}

fn resolve_path(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<PathBuf> {
    match custom_path {
        Some(p) => Ok(PathBuf::from(p)),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path")),
    }
}

/// Loads configuration for the specified app.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = resolve_path(app_name, custom_path)?;

    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)?
        }
    } else {
        // Create config file with defaults
        let cfg = Config::default();
        let content = serde_yaml::to_string(&cfg)?;
        std::fs::write(&config_path, content)?;
        cfg
    };

    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;

    Ok(cfg)
}

/// Saves configuration to the specified path.
pub fn save_config(app_name: &str, config: &Config, custom_path: Option<&str>) -> anyhow::Result<()> {
    let config_path = resolve_path(app_name, custom_path)?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_yaml::to_string(config)?;
    std::fs::write(&config_path, content)?;
    Ok(())
}
