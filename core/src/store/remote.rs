use async_trait::async_trait;

use crate::models::Snapshot;

/// Network-backed document store used for cross-device sync.
///
/// Unlike [`LocalStore`](super::LocalStore), failures are part of the
/// contract: the coordinator turns them into a sync status.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the remote snapshot; `Ok(None)` when nothing has been stored yet.
    async fn load_snapshot(&self) -> Result<Option<Snapshot>, anyhow::Error>;

    /// Create or overwrite the remote snapshot.
    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), anyhow::Error>;
}
