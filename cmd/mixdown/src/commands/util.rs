//! Utility functions for CLI commands.

use std::path::PathBuf;

use mixdown_cli::{Config, Output, OutputFormat, load_config};

use crate::Cli;

pub const APP_NAME: &str = "mixdown";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Builds the result printer from the global flags.
pub fn output_for(cli: &Cli) -> Output {
    Output::new(
        OutputFormat::from_json_flag(cli.json),
        cli.output.as_ref().map(PathBuf::from),
    )
}

/// Prints verbose output if enabled.
pub fn print_verbose(cli: &Cli, msg: &str) {
    mixdown_cli::print_verbose(cli.verbose, msg);
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Formats bytes to human readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
