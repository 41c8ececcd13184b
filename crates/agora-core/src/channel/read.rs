//! Read views over a channel: cursor-advancing "new" reads and cursor-neutral
//! "history" reads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use super::model::{Channel, Message};
use crate::error::{AgoraError, Result};

/// Upper bound on messages returned by one read.
///
/// Values below [`ReadLimit::MIN`] are raised to it; a caller can never ask
/// for fewer than 20 messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct ReadLimit(usize);

impl ReadLimit {
    pub const MIN: usize = 20;

    pub fn new(requested: usize) -> Self {
        Self(requested.max(Self::MIN))
    }

    /// Parses a user-supplied limit. Non-integers are a validation error;
    /// integers (including negative ones) are floored to the minimum.
    /// Integers too large for `i64` saturate.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().parse::<i64>() {
            Ok(requested) => Ok(Self::from_signed(requested)),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Ok(Self(usize::MAX)),
                IntErrorKind::NegOverflow => Ok(Self::default()),
                _ => Err(AgoraError::validation(
                    "Invalid limit parameter. Must be an integer.",
                )),
            },
        }
    }

    fn from_signed(requested: i64) -> Self {
        Self::new(usize::try_from(requested).unwrap_or(0))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ReadLimit {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl FromStr for ReadLimit {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<i64> for ReadLimit {
    type Error = std::convert::Infallible;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        Ok(Self::from_signed(value))
    }
}

impl From<ReadLimit> for u64 {
    fn from(limit: ReadLimit) -> Self {
        limit.0 as u64
    }
}

impl fmt::Display for ReadLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which view a read request asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    #[default]
    New,
    History,
}

impl ReadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadMode::New => "new",
            ReadMode::History => "history",
        }
    }
}

impl FromStr for ReadMode {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new" => Ok(ReadMode::New),
            "history" => Ok(ReadMode::History),
            _ => Err(AgoraError::validation(
                "Invalid mode. Must be 'new' or 'history'",
            )),
        }
    }
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a "new" read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessages {
    /// Returned messages, oldest first.
    pub messages: Vec<Message>,
    /// Total messages in the channel.
    pub total: usize,
    /// `messages.len()`.
    pub new_count: usize,
    /// Older unread messages dropped by the overflow guard.
    pub skipped_count: usize,
}

/// Result of a "history" read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    /// The most recent messages, oldest first.
    pub messages: Vec<Message>,
    pub total: usize,
    pub returned_count: usize,
}

impl Channel {
    /// Consumes everything after `agent`'s cursor.
    ///
    /// At most `limit` of the newest unread messages are returned. Older
    /// unread messages beyond that are skipped: the caller never sees them,
    /// but the cursor still moves past them. On a non-empty channel the
    /// cursor always ends on the last message.
    pub fn take_new(&mut self, agent: &str, limit: ReadLimit) -> NewMessages {
        let unread = self.unread(agent);
        let skipped_count = unread.len().saturating_sub(limit.get());
        let messages = unread[skipped_count..].to_vec();

        if let Some(last) = self.len().checked_sub(1) {
            self.advance_cursor(agent, last);
        }

        NewMessages {
            new_count: messages.len(),
            total: self.len(),
            messages,
            skipped_count,
        }
    }

    /// The latest `limit` messages regardless of any cursor.
    pub fn history(&self, limit: ReadLimit) -> History {
        let messages = self.recent(limit.get()).to_vec();
        History {
            returned_count: messages.len(),
            total: self.len(),
            messages,
        }
    }
}
