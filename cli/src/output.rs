//! Output utilities for CLI tools.

use std::{fs::File, io::Write, path::PathBuf};

use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML format (default).
    #[default]
    Yaml,
    /// JSON format.
    Json,
}

impl OutputFormat {
    /// Picks JSON when requested, YAML otherwise.
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputFormat::Json } else { OutputFormat::Yaml }
    }
}

/// Where and how results are printed.
pub struct Output {
    pub format: OutputFormat,
    /// Result file; stdout when unset.
    pub file: Option<PathBuf>,
}

impl Output {
    /// Creates a new output configuration.
    pub fn new(format: OutputFormat, file: Option<PathBuf>) -> Self {
        Self { format, file }
    }

    /// Renders a value in the configured format.
    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
        })
    }

    /// Outputs the result.
    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let output = self.render(value)?;

        match &self.file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(output.as_bytes())?;
            }
            None => {
                println!("{}", output.trim_end());
            }
        }

        Ok(())
    }
}

/// Prints verbose output if enabled.
pub fn print_verbose(enabled: bool, message: &str) {
    if enabled {
        eprintln!("[verbose] {}", message);
    }
}
