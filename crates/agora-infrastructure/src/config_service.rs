//! Configuration loading.
//!
//! Layers, lowest priority first:
//!
//! 1. Defaults
//! 2. `config.toml` (explicit path, or `~/.config/agora/config.toml`)
//! 3. Environment variables (`AGORA_DATA_FILE`, `AGORA_LOG`)
//!
//! Command-line overrides are applied by the binary on top of the result.

use agora_core::config::AgoraConfig;
use agora_core::{AgoraError, Result};
use std::path::{Path, PathBuf};

use crate::paths::AgoraPaths;
use crate::storage::AtomicFile;

pub const ENV_DATA_FILE: &str = "AGORA_DATA_FILE";
pub const ENV_LOG: &str = "AGORA_LOG";

/// Loads and writes [`AgoraConfig`].
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses `path` as the config file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the platform default config file.
    pub fn default_location() -> Result<Self> {
        let path = AgoraPaths::config_file().map_err(|e| AgoraError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file only. A missing file yields defaults; a malformed one
    /// is an error.
    pub fn load_file(&self) -> Result<AgoraConfig> {
        AtomicFile::<AgoraConfig>::toml(self.path.clone())
            .load()
            .map(Option::unwrap_or_default)
            .map_err(|e| {
                AgoraError::config(format!("{}: {}", self.path.display(), e))
            })
    }

    /// Reads the file and applies environment overrides.
    pub fn load(&self) -> Result<AgoraConfig> {
        let config = self.load_file()?;
        Ok(apply_env(config, |key| std::env::var(key).ok()))
    }

    /// Writes a default config file unless one already exists.
    ///
    /// Returns true if a file was written.
    pub fn init(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        AtomicFile::<AgoraConfig>::toml(self.path.clone()).save(&AgoraConfig::default())?;
        tracing::info!(path = %self.path.display(), "Wrote default config");
        Ok(true)
    }
}

/// Applies environment overrides read through `lookup`.
pub fn apply_env<F>(mut config: AgoraConfig, lookup: F) -> AgoraConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_DATA_FILE).filter(|v| !v.is_empty()) {
        config.data_file = Some(PathBuf::from(path));
    }
    if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
        config.log_level = level;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));
        assert_eq!(service.load_file().unwrap(), AgoraConfig::default());
    }

    #[test]
    fn test_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_file = \"/srv/agora/channels.json\"\ndefault_limit = 30\nlog_level = \"info\"\n",
        )
        .unwrap();

        let config = ConfigService::new(path).load_file().unwrap();
        assert_eq!(config.data_file, Some(PathBuf::from("/srv/agora/channels.json")));
        assert_eq!(config.default_limit.get(), 30);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "default_limit = \"many\"").unwrap();

        let err = ConfigService::new(path).load_file().unwrap_err();
        assert!(matches!(err, AgoraError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DATA_FILE, "/tmp/other.json"),
            (ENV_LOG, "debug"),
        ]
        .into_iter()
        .collect();

        let config = apply_env(AgoraConfig::default(), |k| {
            env.get(k).map(|v| v.to_string())
        });
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/other.json")));
        assert_eq!(config.log_level, "debug");

        let untouched = apply_env(AgoraConfig::default(), |_| Some(String::new()));
        assert_eq!(untouched, AgoraConfig::default());
    }

    #[test]
    fn test_init_writes_once() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("cfg").join("config.toml"));

        assert!(service.init().unwrap());
        assert!(!service.init().unwrap());
        assert_eq!(service.load_file().unwrap(), AgoraConfig::default());
    }
}
