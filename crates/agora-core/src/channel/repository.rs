//! Snapshot repository trait.
//!
//! Defines the interface for persisting the whole channel map.

use async_trait::async_trait;

use super::model::Snapshot;
use crate::error::Result;

/// Exclusive access to a repository, released on drop.
///
/// Implementations wrap whatever they need to hold (a file lock, nothing at
/// all) so callers can keep one value alive across load → mutate → save.
pub struct StoreGuard {
    _inner: Option<Box<dyn Send + Sync>>,
}

impl StoreGuard {
    /// A guard that holds something until dropped.
    pub fn new<G: Send + Sync + 'static>(inner: G) -> Self {
        Self {
            _inner: Some(Box::new(inner)),
        }
    }

    /// A guard for stores that need no external exclusion.
    pub fn unlocked() -> Self {
        Self { _inner: None }
    }
}

impl std::fmt::Debug for StoreGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreGuard")
            .field("held", &self._inner.is_some())
            .finish()
    }
}

/// An abstract repository for the channel snapshot.
///
/// The store has no intrinsic locking around `load`/`save`; callers that
/// mutate must hold the guard returned by [`SnapshotRepository::lock`] for the
/// whole cycle.
///
/// # Implementation Notes
///
/// - `load` returns an empty snapshot if nothing has been persisted yet
/// - `save` must be crash-consistent: an interrupted save leaves the
///   previous snapshot readable
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Loads the full snapshot.
    ///
    /// # Returns
    ///
    /// - `Ok(Snapshot)`: Persisted state, or an empty snapshot if none exists
    /// - `Err(_)`: Stored state could not be read or parsed
    async fn load(&self) -> Result<Snapshot>;

    /// Replaces the persisted snapshot with `snapshot`.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Acquires exclusive access across processes sharing the same store.
    async fn lock(&self) -> Result<StoreGuard>;
}
