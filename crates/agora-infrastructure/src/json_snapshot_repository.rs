//! JSON-file based SnapshotRepository implementation.

use agora_core::channel::{Snapshot, SnapshotRepository, StoreGuard};
use agora_core::{AgoraError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::paths::AgoraPaths;
use crate::storage::AtomicFile;

/// Stores the whole channel map as one pretty-printed JSON document.
///
/// ```text
/// channels.json        # the snapshot, replaced atomically on save
/// channels.json.lock   # advisory lock held across load → mutate → save
/// .channels.json.tmp   # transient, only while a save is in flight
/// ```
pub struct JsonSnapshotRepository {
    file: AtomicFile<Snapshot>,
}

impl JsonSnapshotRepository {
    /// Creates a repository backed by `path`. Nothing is touched on disk
    /// until the first save or lock.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicFile::json(path.into()),
        }
    }

    /// Creates a repository at the platform default location
    /// (e.g. `~/.local/share/agora/channels.json`).
    pub fn default_location() -> Result<Self> {
        let path = AgoraPaths::snapshot_file().map_err(|e| AgoraError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
impl SnapshotRepository for JsonSnapshotRepository {
    async fn load(&self) -> Result<Snapshot> {
        let snapshot = self.file.load()?.unwrap_or_default();
        tracing::debug!(
            path = %self.path().display(),
            channels = snapshot.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.file.save(snapshot)?;
        tracing::debug!(
            path = %self.path().display(),
            channels = snapshot.len(),
            "Saved snapshot"
        );
        Ok(())
    }

    async fn lock(&self) -> Result<StoreGuard> {
        let path = self.path().to_path_buf();
        let lock = tokio::task::spawn_blocking(move || AtomicFile::<Snapshot>::json(path).lock())
            .await
            .map_err(|e| AgoraError::internal(format!("Lock task failed: {}", e)))??;
        Ok(StoreGuard::new(lock))
    }
}
