//! Unified path management for agora files.
//!
//! ```text
//! ~/.config/agora/             # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/agora/        # Data directory
//! ├── channels.json            # Channel snapshot
//! └── channels.json.lock       # Cross-process lock
//! ```
//!
//! Exact locations follow the platform conventions of the `dirs` crate.

use std::path::PathBuf;

const APP_DIR: &str = "agora";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// No config directory could be determined for this platform/user.
    ConfigDirNotFound,
    /// No data directory could be determined for this platform/user.
    DataDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
            PathError::DataDirNotFound => write!(f, "Cannot find data directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Default file locations.
pub struct AgoraPaths;

impl AgoraPaths {
    /// Returns the agora configuration directory (e.g. `~/.config/agora/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the agora data directory (e.g. `~/.local/share/agora/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DataDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the channel snapshot.
    pub fn snapshot_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("channels.json"))
    }
}
