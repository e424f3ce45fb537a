//! Path utilities for mixdown applications.

use std::io;
use std::path::PathBuf;

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".mixdown";

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Provides access to the mixdown directory structure.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Application name.
    pub app_name: String,
    /// User's home directory.
    pub home_dir: PathBuf,
}

impl Paths {
    /// Creates a new Paths instance for the given app.
    pub fn new(app_name: impl Into<String>) -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self {
            app_name: app_name.into(),
            home_dir,
        })
    }

    /// Returns the base directory (~/.mixdown).
    pub fn base_dir(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_BASE_DIR)
    }

    /// Returns the app-specific directory (~/.mixdown/<app>).
    pub fn app_dir(&self) -> PathBuf {
        self.base_dir().join(&self.app_name)
    }

    /// Returns the config file path (~/.mixdown/<app>/config.yaml).
    pub fn config_file(&self) -> PathBuf {
        self.app_dir().join(DEFAULT_CONFIG_FILE)
    }

    /// Returns the default output directory (~/.mixdown/<app>/output).
    pub fn output_dir(&self) -> PathBuf {
        self.app_dir().join("output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_structure() {
        let paths = Paths {
            app_name: "testapp".into(),
            home_dir: PathBuf::from("/home/tester"),
        };

        assert_eq!(paths.base_dir(), PathBuf::from("/home/tester/.mixdown"));
        assert!(paths.app_dir().ends_with(".mixdown/testapp"));
        assert!(paths.config_file().ends_with("testapp/config.yaml"));
        assert!(paths.output_dir().ends_with("testapp/output"));
    }
}
