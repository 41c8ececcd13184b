//! Identifier validation shared by channel names and agent names.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AgoraError, Result};

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("name pattern is a valid regex"));

/// Which identifier a name is being validated as.
///
/// Only affects the wording of the error; the accepted character class is
/// the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Channel,
    Agent,
}

impl NameKind {
    pub fn label(self) -> &'static str {
        match self {
            NameKind::Channel => "channel name",
            NameKind::Agent => "agent name",
        }
    }
}

/// Returns true if `name` is a non-empty run of `[a-z0-9_]`.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Validates `name`, naming the offending field on failure.
pub fn validate_name(kind: NameKind, name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(AgoraError::validation(format!(
            "Invalid {}: only lowercase letters, numbers, and underscores allowed",
            kind.label()
        )))
    }
}
