//! Configuration management commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use mixdown_cli::Config;

use super::{get_config, output_for, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Configuration is stored in ~/.mixdown/mixdown/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// View the current configuration
    View,
    /// Print the config file path
    Path,
    /// Set a configuration value
    Set {
        /// Key, e.g. output.codec, output.bitrate_kbps, fetch.timeout_secs
        key: String,
        /// New value
        value: String,
    },
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;
                output_for(cli).write(&cfg)
            }

            ConfigSubcommand::Path => {
                let cfg = get_config(cli)?;
                println!("{}", cfg.path().display());
                Ok(())
            }

            ConfigSubcommand::Set { key, value } => {
                let mut cfg = get_config(cli)?;
                set_value(&mut cfg, key, value)?;
                cfg.save()?;
                print_success(&format!("{} = {}", key, value));
                Ok(())
            }
        }
    }
}

fn set_value(cfg: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());

    match key {
        "output.codec" => cfg.output.codec = value.parse().map_err(anyhow::Error::msg)?,
        "output.bitrate_kbps" => cfg.output.bitrate_kbps = value.parse()?,
        "output.dir" => cfg.output.dir = optional(value).map(PathBuf::from),
        "output.public_base_url" => cfg.output.public_base_url = optional(value),
        "fetch.timeout_secs" => cfg.fetch.timeout_secs = value.parse()?,
        "fetch.allow_local_files" => cfg.fetch.allow_local_files = value.parse()?,
        "work_dir" => cfg.work_dir = optional(value).map(PathBuf::from),
        "resampler" => cfg.resampler = value.parse().map_err(anyhow::Error::msg)?,
        _ => anyhow::bail!("unknown config key '{}'", key),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixdown_audio::resampler::ResampleQuality;
    use mixdown_compose::OutputCodec;

    #[test]
    fn test_set_value() {
        let mut cfg = Config::default();
        set_value(&mut cfg, "output.codec", "wav").unwrap();
        set_value(&mut cfg, "output.bitrate_kbps", "128").unwrap();
        set_value(&mut cfg, "fetch.allow_local_files", "true").unwrap();
        set_value(&mut cfg, "resampler", "fft").unwrap();
        set_value(&mut cfg, "work_dir", "/tmp/mix").unwrap();

        assert_eq!(cfg.output.codec, OutputCodec::Wav);
        assert_eq!(cfg.output.bitrate_kbps, 128);
        assert!(cfg.fetch.allow_local_files);
        assert_eq!(cfg.resampler, ResampleQuality::Fft);
        assert_eq!(cfg.work_dir, Some(PathBuf::from("/tmp/mix")));

        set_value(&mut cfg, "work_dir", "").unwrap();
        assert!(cfg.work_dir.is_none());
    }

    #[test]
    fn test_set_value_rejects() {
        let mut cfg = Config::default();
        assert!(set_value(&mut cfg, "nope", "1").is_err());
        assert!(set_value(&mut cfg, "output.codec", "flac").is_err());
        assert!(set_value(&mut cfg, "fetch.timeout_secs", "-1").is_err());
    }
}
