use agora_core::channel::{
    ChannelInfo, ChannelSummary, History, Message, NewMessages, ReadLimit, ReadMode, Snapshot,
    SnapshotRepository,
};
use agora_core::error::{AgoraError, Result};
use agora_core::name::{NameKind, validate_name};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Number of messages shown by [`ChannelService::channel_info`].
pub const INFO_RECENT_MESSAGES: usize = 10;

/// Raw read parameters as they arrive from a transport.
#[derive(Debug, Clone, Default)]
pub struct ReadRequest {
    pub channel: String,
    pub agent: String,
    /// `"new"` (default) or `"history"`.
    pub mode: Option<String>,
    /// Integer string; defaults to the service's default limit.
    pub limit: Option<String>,
}

/// Result of [`ChannelService::read`], tagged by mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ReadResponse {
    New(NewMessages),
    History(History),
}

impl ReadResponse {
    pub fn mode(&self) -> ReadMode {
        match self {
            ReadResponse::New(_) => ReadMode::New,
            ReadResponse::History(_) => ReadMode::History,
        }
    }

    pub fn messages(&self) -> &[Message] {
        match self {
            ReadResponse::New(r) => &r.messages,
            ReadResponse::History(r) => &r.messages,
        }
    }
}

/// The channel log service.
///
/// Every operation runs one load → mutate → save cycle against the
/// repository. Cycles are serialized twice over:
/// - in-process by `cycle`, a single mutex over the whole snapshot
/// - across processes by the repository's [`StoreGuard`](agora_core::channel::StoreGuard)
///
/// Validation and admission failures return before anything is written, and
/// a failed save leaves the previously persisted snapshot untouched.
pub struct ChannelService {
    repository: Arc<dyn SnapshotRepository>,
    cycle: Mutex<()>,
    default_limit: ReadLimit,
}

impl ChannelService {
    /// Creates a new `ChannelService` over `repository`.
    pub fn new(repository: Arc<dyn SnapshotRepository>) -> Self {
        Self {
            repository,
            cycle: Mutex::new(()),
            default_limit: ReadLimit::default(),
        }
    }

    /// Sets the limit used when a [`ReadRequest`] carries none.
    pub fn with_default_limit(mut self, limit: ReadLimit) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn default_limit(&self) -> ReadLimit {
        self.default_limit
    }

    /// Posts `text` to `channel` as `agent`.
    ///
    /// The agent must have consumed every message in the channel first,
    /// including its own from an earlier session. On success the sender's
    /// cursor covers the new message.
    ///
    /// # Returns
    ///
    /// The index of the appended message.
    ///
    /// # Errors
    ///
    /// - `Validation` for a missing field or malformed name
    /// - `NotCaughtUp` if the agent has unread messages
    /// - persistence errors from the repository
    pub async fn send(&self, channel: &str, agent: &str, text: &str) -> Result<usize> {
        if channel.is_empty() || agent.is_empty() || text.is_empty() {
            return Err(AgoraError::validation("Missing channel, agent, or text"));
        }
        validate_name(NameKind::Channel, channel)?;
        validate_name(NameKind::Agent, agent)?;

        let _cycle = self.cycle.lock().await;
        let _guard = self.repository.lock().await?;
        let mut snapshot = self.repository.load().await?;

        let (log, created) = snapshot.get_or_create(channel);
        if created {
            tracing::debug!(channel, "Created channel");
        }

        let unread_count = log.unread_count(agent);
        if unread_count > 0 {
            tracing::warn!(channel, agent, unread_count, "Rejected send from agent that is behind");
            return Err(AgoraError::not_caught_up(channel, agent, unread_count));
        }

        let index = log.append(Message::new(agent, text, Utc::now()));
        self.repository.save(&snapshot).await?;

        tracing::info!(channel, agent, index, "Message appended");
        Ok(index)
    }

    /// Returns what `agent` has not read yet in `channel`, at most `limit`
    /// messages, and moves its cursor to the end of the channel.
    ///
    /// Unread messages older than the newest `limit` are skipped and
    /// reported through `skipped_count`. A channel that does not exist yet
    /// is created and persisted, so it shows up in [`ChannelService::list_channels`].
    pub async fn read_new(
        &self,
        channel: &str,
        agent: &str,
        limit: ReadLimit,
    ) -> Result<NewMessages> {
        validate_identity(channel, agent)?;

        let _cycle = self.cycle.lock().await;
        let _guard = self.repository.lock().await?;
        let mut snapshot = self.repository.load().await?;

        let (log, created) = snapshot.get_or_create(channel);
        let result = log.take_new(agent, limit);
        let dirty = created || !log.is_empty();

        if dirty {
            self.repository.save(&snapshot).await?;
        }
        if created {
            tracing::debug!(channel, "Created channel");
        }

        tracing::info!(
            channel,
            agent,
            returned = result.new_count,
            skipped = result.skipped_count,
            total = result.total,
            "Read new messages"
        );
        Ok(result)
    }

    /// Returns the latest `limit` messages of `channel` without touching
    /// any cursor.
    ///
    /// Reading a channel that does not exist creates it, like every other
    /// reference does; an existing channel is never written.
    pub async fn read_history(
        &self,
        channel: &str,
        agent: &str,
        limit: ReadLimit,
    ) -> Result<History> {
        validate_identity(channel, agent)?;

        let _cycle = self.cycle.lock().await;
        let snapshot = self.repository.load().await?;

        let result = match snapshot.get(channel) {
            Some(log) => log.history(limit),
            None => self.create_channel(channel).await?,
        };

        tracing::info!(
            channel,
            agent,
            returned = result.returned_count,
            total = result.total,
            "Read history"
        );
        Ok(result)
    }

    /// Parses and validates a raw [`ReadRequest`] and dispatches on its mode.
    ///
    /// Checks run in this order: missing channel, missing agent, mode,
    /// limit, channel name, agent name.
    pub async fn read(&self, request: &ReadRequest) -> Result<ReadResponse> {
        if request.channel.is_empty() {
            return Err(AgoraError::validation("Missing channel parameter"));
        }
        if request.agent.is_empty() {
            return Err(AgoraError::validation("Missing agent parameter"));
        }
        let mode = match request.mode.as_deref() {
            Some(raw) => raw.parse::<ReadMode>()?,
            None => ReadMode::default(),
        };
        let limit = match request.limit.as_deref() {
            Some(raw) => ReadLimit::parse(raw)?,
            None => self.default_limit,
        };

        match mode {
            ReadMode::New => self
                .read_new(&request.channel, &request.agent, limit)
                .await
                .map(ReadResponse::New),
            ReadMode::History => self
                .read_history(&request.channel, &request.agent, limit)
                .await
                .map(ReadResponse::History),
        }
    }

    /// Lists every channel with its message count, sorted by name.
    pub async fn list_channels(&self) -> Result<Vec<ChannelSummary>> {
        let _cycle = self.cycle.lock().await;
        Ok(self.repository.load().await?.summaries())
    }

    /// Total count and the latest messages of `channel`, or `None` if it does
    /// not exist. Never creates the channel.
    pub async fn channel_info(&self, channel: &str) -> Result<Option<ChannelInfo>> {
        validate_name(NameKind::Channel, channel)?;

        let _cycle = self.cycle.lock().await;
        let snapshot: Snapshot = self.repository.load().await?;
        Ok(snapshot.info(channel, INFO_RECENT_MESSAGES))
    }

    /// Creates an empty channel under the store lock. Caller holds `cycle`.
    async fn create_channel(&self, channel: &str) -> Result<History> {
        let _guard = self.repository.lock().await?;
        let mut snapshot = self.repository.load().await?;
        let (_, created) = snapshot.get_or_create(channel);
        if created {
            self.repository.save(&snapshot).await?;
            tracing::debug!(channel, "Created channel");
        }
        Ok(History::default())
    }
}

fn validate_identity(channel: &str, agent: &str) -> Result<()> {
    if channel.is_empty() {
        return Err(AgoraError::validation("Missing channel parameter"));
    }
    if agent.is_empty() {
        return Err(AgoraError::validation("Missing agent parameter"));
    }
    validate_name(NameKind::Channel, channel)?;
    validate_name(NameKind::Agent, agent)
}
