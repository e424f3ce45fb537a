//! CLI commands module.

mod config;
mod mix;
mod util;

pub use config::ConfigCommand;
pub use mix::MixCommand;

// Re-export utils for use in commands
pub(crate) use util::*;
