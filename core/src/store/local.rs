use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::Snapshot;

/// Auxiliary values kept beside the snapshot, outside the main document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretKey {
    /// Token used to authenticate against the remote document store.
    AccessToken,
    /// Handle of the remote document holding the snapshot.
    RemoteDocumentId,
}

impl SecretKey {
    pub const ALL: [SecretKey; 2] = [SecretKey::AccessToken, SecretKey::RemoteDocumentId];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RemoteDocumentId => "remote_document_id",
        }
    }
}

impl std::fmt::Display for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-device persistence for the snapshot and its secrets.
///
/// Reads return `None` for anything missing or unreadable; writes report
/// failures but callers treat them as best effort.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn load_snapshot(&self) -> Option<Snapshot>;

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    async fn load_secret(&self, key: SecretKey) -> Option<String>;

    async fn save_secret(&self, key: SecretKey, value: &str) -> Result<(), StoreError>;

    async fn clear_secret(&self, key: SecretKey) -> Result<(), StoreError>;
}
