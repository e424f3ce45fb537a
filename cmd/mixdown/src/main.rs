//! Mixdown CLI - mixes narration, sound effects and background music.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ConfigCommand, MixCommand};

/// Mixdown CLI - composes a narration track with sound effects and a music bed.
///
/// A mix request names a narration clip, a list of sound effects placed at
/// absolute times, and an optional background music bed the narration enters
/// after an intro offset. The mixed result is written as MP3 (or WAV).
///
/// Configuration is stored in ~/.mixdown/mixdown/config.yaml.
#[derive(Parser)]
#[command(name = "mixdown")]
#[command(about = "Audio timeline compositor")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.mixdown/mixdown/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Result file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Input request file (YAML or JSON, `-` for stdin)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Mix a request into one audio file
    Mix(MixCommand),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli),
        Commands::Mix(cmd) => cmd.run(&cli).await,
    }
}
