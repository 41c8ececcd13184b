//! In-memory SnapshotRepository implementation.

use agora_core::Result;
use agora_core::channel::{Snapshot, SnapshotRepository, StoreGuard};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Keeps the snapshot in process memory. Nothing survives a restart.
///
/// Useful for tests and for embedding the channel log in a process that
/// owns its own persistence.
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    snapshot: RwLock<Snapshot>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.write().await = snapshot.clone();
        Ok(())
    }

    async fn lock(&self) -> Result<StoreGuard> {
        // Only reachable through one process; callers serialize in-process.
        Ok(StoreGuard::unlocked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::channel::Message;
    use chrono::Utc;

    #[tokio::test]
    async fn test_save_then_load() {
        let repo = InMemorySnapshotRepository::new();
        assert!(repo.load().await.unwrap().is_empty());

        let mut snapshot = Snapshot::new();
        snapshot
            .get_or_create("proj")
            .0
            .append(Message::new("bob", "hi", Utc::now()));
        repo.save(&snapshot).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_loaded_copy_is_detached() {
        let repo = InMemorySnapshotRepository::with_snapshot(Snapshot::new());
        let mut copy = repo.load().await.unwrap();
        copy.get_or_create("proj");
        assert!(repo.load().await.unwrap().is_empty());
    }
}
