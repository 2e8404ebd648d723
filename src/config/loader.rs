//! Configuration file loader.

use std::path::{Path, PathBuf};

use super::LauncherConfig;

/// Finds and parses the launcher's TOML file.
///
/// Without `--config` the first existing file among `.relaunch.toml` and
/// `<config dir>/relaunch/config.toml` wins, and no file at all means
/// defaults. A path given with `--config` must exist.
#[derive(Debug)]
pub struct ConfigLoader {
    candidates: Vec<PathBuf>,
    required: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let candidates = std::iter::once(PathBuf::from(".relaunch.toml"))
            .chain(dirs::config_dir().map(|dir| dir.join("relaunch").join("config.toml")))
            .collect();
        Self {
            candidates,
            required: false,
        }
    }

    /// Load exactly `path`; a missing file is an error.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            candidates: vec![path],
            required: true,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed, or if an
    /// explicit path does not exist.
    pub fn load(&self) -> Result<LauncherConfig, ConfigError> {
        let found = if self.required {
            self.candidates.first()
        } else {
            self.candidates.iter().find(|path| path.is_file())
        };

        match found {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                parse_file(path)
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(LauncherConfig::default())
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_file(path: &Path) -> Result<LauncherConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}
