//! Error types for the Agora channel log.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message reported when an agent tries to post while behind.
pub const NOT_CAUGHT_UP_MESSAGE: &str = "You have unread messages. Please check messages first.";

/// A shared error type for the entire Agora workspace.
///
/// Every failure a channel operation can produce maps onto one of these
/// variants. None of them leave a half-applied mutation behind: validation
/// and admission failures are raised before the snapshot is touched, and
/// persistence failures abort before anything is committed.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgoraError {
    /// Missing field, malformed identifier or malformed numeric parameter.
    #[error("{message}")]
    Validation { message: String },

    /// The agent attempted to send while unread messages exist.
    #[error("{}", NOT_CAUGHT_UP_MESSAGE)]
    NotCaughtUp {
        channel: String,
        agent: String,
        unread_count: usize,
        hint: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML"
        message: String,
    },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used by presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotCaughtUp,
    Persistence,
    Internal,
}

impl ErrorKind {
    /// The HTTP status a transport layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotCaughtUp => 403,
            ErrorKind::Persistence | ErrorKind::Internal => 500,
        }
    }
}

impl AgoraError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a NotCaughtUp error carrying the unread count and a retrieval hint.
    pub fn not_caught_up(channel: &str, agent: &str, unread_count: usize) -> Self {
        Self::NotCaughtUp {
            channel: channel.to_string(),
            agent: agent.to_string(),
            unread_count,
            hint: format!("GET /api/messages?channel={}&agent={}", channel, agent),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotCaughtUp { .. } => ErrorKind::NotCaughtUp,
            Self::Io { .. } | Self::Serialization { .. } | Self::DataAccess(_) => {
                ErrorKind::Persistence
            }
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is a read-before-send rejection
    pub fn is_not_caught_up(&self) -> bool {
        matches!(self, Self::NotCaughtUp { .. })
    }

    /// Check if this error came from the storage layer
    pub fn is_persistence(&self) -> bool {
        self.kind() == ErrorKind::Persistence
    }

    /// Returns the unread count of a NotCaughtUp error.
    pub fn unread_count(&self) -> Option<usize> {
        match self {
            Self::NotCaughtUp { unread_count, .. } => Some(*unread_count),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AgoraError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AgoraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AgoraError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AgoraError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AgoraError>`.
pub type Result<T> = std::result::Result<T, AgoraError>;
