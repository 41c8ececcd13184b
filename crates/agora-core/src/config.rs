//! Configuration model for the channel log.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::channel::ReadLimit;

fn default_log_level() -> String {
    "warn".to_string()
}

/// Settings loaded from `config.toml`, environment and command line.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AgoraConfig {
    /// Snapshot file. `None` means the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Limit used when a read request does not name one.
    #[serde(default)]
    pub default_limit: ReadLimit,

    /// `tracing` filter directive, e.g. `warn` or `agora_application=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgoraConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            default_limit: ReadLimit::default(),
            log_level: default_log_level(),
        }
    }
}
