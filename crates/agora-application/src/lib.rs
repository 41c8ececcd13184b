//! Use cases for the Agora channel log: posting and reading under the read-before-send rule.

pub mod channel_service;

pub use channel_service::{ChannelService, ReadRequest, ReadResponse, INFO_RECENT_MESSAGES};
