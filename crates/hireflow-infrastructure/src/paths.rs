//! Path management for hireflow configuration files.
//!
//! ```text
//! ~/.config/hireflow/          # Config directory (XDG on Linux, platform default elsewhere)
//! └── config.toml              # Application configuration
//! ```
//!
//! `HIREFLOW_CONFIG` points at an alternative config file.

use std::path::PathBuf;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "HIREFLOW_CONFIG";

const APP_DIR_NAME: &str = "hireflow";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct HireflowPaths;

impl HireflowPaths {
    /// Returns the hireflow configuration directory (e.g. `~/.config/hireflow/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the default path of `config.toml`, ignoring any override.
    pub fn default_config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Resolves the config file, honoring an explicit override first.
    ///
    /// `override_path` is usually the value of `HIREFLOW_CONFIG`; empty
    /// values are ignored.
    pub fn resolve_config_file(override_path: Option<&str>) -> Result<PathBuf, PathError> {
        match override_path.map(str::trim).filter(|path| !path.is_empty()) {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_config_file(),
        }
    }
}
