//! Channel log domain models.
//!
//! A [`Snapshot`] maps channel names to [`Channel`]s. Each channel owns an
//! append-only sequence of [`Message`]s and a cursor per agent marking the
//! last message index that agent has consumed.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A single posted message. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// When the message was appended (RFC 3339, UTC).
    #[serde(
        rename = "time",
        alias = "timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub timestamp: DateTime<Utc>,
    /// The posting agent.
    pub agent: String,
    /// Message body.
    pub text: String,
}

impl Message {
    pub fn new(agent: impl Into<String>, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            agent: agent.into(),
            text: text.into(),
        }
    }
}

/// Accepts RFC 3339, or an ISO 8601 date-time without offset read as local
/// time (`2025-10-23T10:13:40.123456`).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive = raw
        .parse::<NaiveDateTime>()
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))?;
    Ok(Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc()))
}

/// One channel's message log and read cursors.
///
/// Invariants:
/// - every cursor value is a valid index into `messages`
/// - a cursor never moves backwards
///
/// The channel name is the key it is stored under in the [`Snapshot`].
/// Cursors loaded past the end are pulled back to the last message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChannelRecord")]
pub struct Channel {
    messages: Vec<Message>,
    /// agent → index of the last consumed message. Absent means nothing read.
    last_read: BTreeMap<String, usize>,
}

/// Channel as stored, before cursor clamping.
#[derive(Deserialize)]
struct ChannelRecord {
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    last_read: BTreeMap<String, usize>,
}

impl From<ChannelRecord> for Channel {
    fn from(record: ChannelRecord) -> Self {
        let last_read = match record.messages.len().checked_sub(1) {
            Some(last) => record
                .last_read
                .into_iter()
                .map(|(agent, index)| (agent, index.min(last)))
                .collect(),
            None => BTreeMap::new(),
        };
        Self {
            messages: record.messages,
            last_read,
        }
    }
}

impl Channel {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All cursors, keyed by agent.
    pub fn cursors(&self) -> &BTreeMap<String, usize> {
        &self.last_read
    }

    /// The last index `agent` has consumed, or `None` if it has read nothing.
    pub fn cursor(&self, agent: &str) -> Option<usize> {
        self.last_read.get(agent).copied()
    }

    /// Index of the first message `agent` has not consumed yet.
    pub fn next_unread(&self, agent: &str) -> usize {
        self.cursor(agent).map_or(0, |index| index + 1)
    }

    /// Number of messages posted after `agent`'s cursor.
    pub fn unread_count(&self, agent: &str) -> usize {
        self.len().saturating_sub(self.next_unread(agent))
    }

    /// Messages after `agent`'s cursor, oldest first.
    pub fn unread(&self, agent: &str) -> &[Message] {
        let start = self.next_unread(agent).min(self.len());
        &self.messages[start..]
    }

    /// The most recent `limit` messages, oldest first.
    pub fn recent(&self, limit: usize) -> &[Message] {
        let start = self.len().saturating_sub(limit);
        &self.messages[start..]
    }

    /// Appends a message and marks the author caught up through it.
    ///
    /// Returns the index of the new message. Admission is the caller's
    /// responsibility; see [`Channel::unread_count`].
    pub fn append(&mut self, message: Message) -> usize {
        let index = self.messages.len();
        let agent = message.agent.clone();
        self.messages.push(message);
        self.advance_cursor(&agent, index);
        index
    }

    /// Moves `agent`'s cursor forward to `index`.
    ///
    /// Requests that would move the cursor backwards, or past the last
    /// message, are clamped. Returns the cursor after the call.
    pub fn advance_cursor(&mut self, agent: &str, index: usize) -> Option<usize> {
        let last = self.len().checked_sub(1)?;
        let target = index.min(last);
        let cursor = self.last_read.entry(agent.to_string()).or_insert(target);
        if target > *cursor {
            *cursor = target;
        }
        Some(*cursor)
    }
}

/// Directory entry for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub name: String,
    pub message_count: usize,
}

/// Read-only overview of a channel for human viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub name: String,
    pub total: usize,
    /// The latest messages, oldest first.
    pub recent: Vec<Message>,
}

/// The complete persisted state: channel name → channel.
///
/// Serializes as a single JSON object whose keys are channel names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    channels: BTreeMap<String, Channel>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, &Channel)> {
        self.channels.iter().map(|(name, channel)| (name.as_str(), channel))
    }

    /// Looks up `name`, inserting an empty channel if it is absent.
    ///
    /// The returned flag is true when the channel was created by this call,
    /// i.e. the snapshot is now dirty even if nothing else changes.
    pub fn get_or_create(&mut self, name: &str) -> (&mut Channel, bool) {
        let created = !self.channels.contains_key(name);
        let channel = self.channels.entry(name.to_string()).or_default();
        (channel, created)
    }

    /// Name and message count of every channel, sorted by name.
    pub fn summaries(&self) -> Vec<ChannelSummary> {
        self.channels
            .iter()
            .map(|(name, channel)| ChannelSummary {
                name: name.clone(),
                message_count: channel.len(),
            })
            .collect()
    }

    /// Overview of `name` with its latest `recent` messages, if it exists.
    pub fn info(&self, name: &str, recent: usize) -> Option<ChannelInfo> {
        self.channels.get(name).map(|channel| ChannelInfo {
            name: name.to_string(),
            total: channel.len(),
            recent: channel.recent(recent).to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(agent: &str, text: &str) -> Message {
        Message::new(agent, text, Utc::now())
    }

    #[test]
    fn test_new_channel_is_empty() {
        let channel = Channel::new();
        assert!(channel.is_empty());
        assert!(channel.cursors().is_empty());
        assert_eq!(channel.cursor("bob"), None);
        assert_eq!(channel.unread_count("bob"), 0);
    }

    #[test]
    fn test_append_marks_author_caught_up() {
        let mut channel = Channel::new();
        assert_eq!(channel.append(msg("bob", "hi")), 0);
        assert_eq!(channel.append(msg("bob", "again")), 1);
        assert_eq!(channel.cursor("bob"), Some(1));
        assert_eq!(channel.unread_count("bob"), 0);
        assert_eq!(channel.unread_count("alice"), 2);
    }

    #[test]
    fn test_cursor_never_moves_backwards() {
        let mut channel = Channel::new();
        for i in 0..5 {
            channel.append(msg("bob", &format!("m{i}")));
        }
        assert_eq!(channel.advance_cursor("alice", 3), Some(3));
        assert_eq!(channel.advance_cursor("alice", 1), Some(3));
        assert_eq!(channel.advance_cursor("alice", 99), Some(4));
        assert_eq!(channel.cursor("alice"), Some(4));
    }

    #[test]
    fn test_advance_on_empty_channel_is_noop() {
        let mut channel = Channel::new();
        assert_eq!(channel.advance_cursor("alice", 0), None);
        assert!(channel.cursors().is_empty());
    }

    #[test]
    fn test_unread_and_recent_slices() {
        let mut channel = Channel::new();
        for i in 0..6 {
            channel.append(msg("bob", &format!("m{i}")));
        }
        channel.advance_cursor("alice", 3);
        let unread: Vec<_> = channel.unread("alice").iter().map(|m| m.text.as_str()).collect();
        assert_eq!(unread, vec!["m4", "m5"]);

        let recent: Vec<_> = channel.recent(2).iter().map(|m| m.text.as_str()).collect();
        assert_eq!(recent, vec!["m4", "m5"]);
        assert_eq!(channel.recent(100).len(), 6);
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut snapshot = Snapshot::new();
        let (_, created) = snapshot.get_or_create("proj");
        assert!(created);
        let (channel, created) = snapshot.get_or_create("proj");
        assert!(!created);
        assert!(channel.is_empty());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_summaries_sorted_by_name() {
        let mut snapshot = Snapshot::new();
        snapshot.get_or_create("zeta").0.append(msg("a", "x"));
        snapshot.get_or_create("alpha");
        let summaries = snapshot.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "alpha");
        assert_eq!(summaries[0].message_count, 0);
        assert_eq!(summaries[1].name, "zeta");
        assert_eq!(summaries[1].message_count, 1);
    }

    #[test]
    fn test_info_does_not_create() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.info("ghost", 10).is_none());
        assert!(!snapshot.contains("ghost"));

        let (channel, _) = snapshot.get_or_create("proj");
        for i in 0..15 {
            channel.append(msg("bob", &format!("m{i}")));
        }
        let info = snapshot.info("proj", 10).unwrap();
        assert_eq!(info.total, 15);
        assert_eq!(info.recent.len(), 10);
        assert_eq!(info.recent[0].text, "m5");
    }

    #[test]
    fn test_snapshot_json_layout() {
        let mut snapshot = Snapshot::new();
        snapshot.get_or_create("proj").0.append(msg("bob", "hello"));

        let value = serde_json::to_value(&snapshot).unwrap();
        let proj = &value["proj"];
        assert_eq!(proj["messages"][0]["agent"], "bob");
        assert_eq!(proj["messages"][0]["text"], "hello");
        assert!(proj["messages"][0]["time"].is_string());
        assert_eq!(proj["last_read"]["bob"], 0);
    }

    #[test]
    fn test_snapshot_accepts_timestamps_without_offset() {
        let json = r#"{"proj": {"messages": [
            {"time": "2025-10-23T10:13:40.123456", "agent": "bob", "text": "hi"},
            {"time": "2025-10-23T10:14:00", "agent": "alice", "text": "yo"}
        ], "last_read": {"bob": 0, "alice": 1}}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let channel = snapshot.get("proj").unwrap();
        assert_eq!(channel.len(), 2);

        let expected: NaiveDateTime = "2025-10-23T10:13:40.123456".parse().unwrap();
        let local = channel.messages()[0].timestamp.with_timezone(&Local);
        assert_eq!(local.naive_local(), expected);

        // Written back as RFC 3339.
        let value = serde_json::to_value(&snapshot).unwrap();
        let time = value["proj"]["messages"][0]["time"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(time).is_ok(), "{time}");
    }

    #[test]
    fn test_snapshot_rejects_garbage_timestamp() {
        let json = r#"{"proj": {"messages": [
            {"time": "yesterday", "agent": "bob", "text": "hi"}
        ]}}"#;
        assert!(serde_json::from_str::<Snapshot>(json).is_err());
    }

    #[test]
    fn test_loaded_cursor_past_end_is_clamped() {
        let json = r#"{"proj": {"messages": [
            {"time": "2025-01-02T03:04:05Z", "agent": "bob", "text": "hi"}
        ], "last_read": {"alice": 7, "bob": 0}}, "empty": {"messages": [], "last_read": {"carol": 3}}}"#;
        let mut snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.get("empty").unwrap().cursors().is_empty());

        let (channel, _) = snapshot.get_or_create("proj");
        assert_eq!(channel.cursor("alice"), Some(0));
        assert_eq!(channel.unread_count("alice"), 0);

        assert_eq!(channel.append(msg("alice", "reply")), 1);
        assert_eq!(channel.cursor("alice"), Some(1));
        assert_eq!(channel.unread_count("bob"), 1);
    }

    #[test]
    fn test_snapshot_accepts_missing_last_read() {
        let json = r#"{"proj": {"messages": [
            {"timestamp": "2025-01-02T03:04:05Z", "agent": "bob", "text": "hi"}
        ]}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let channel = snapshot.get("proj").unwrap();
        assert_eq!(channel.len(), 1);
        assert_eq!(channel.cursor("bob"), None);
        assert_eq!(channel.unread_count("bob"), 1);
    }
}
