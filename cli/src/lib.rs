//! CLI utilities for mixdown.
//!
//! Configuration file handling, request file loading and result printing
//! shared by the command-line tools.

pub mod config;
pub mod output;
pub mod paths;
pub mod request;

pub use config::{Config, FetchConfig, OutputConfig, load_config, save_config};
pub use output::{Output, OutputFormat, print_verbose};
pub use paths::Paths;
pub use request::{RequestError, load_request, parse_request};
