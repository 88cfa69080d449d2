//! Directory-backed [`LocalStore`].
//!
//! Layout:
//! ```text
//! <dir>/snapshot.json
//! <dir>/secrets/access_token
//! <dir>/secrets/remote_document_id
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use hearth_core::api::{LocalStore, SecretKey, Snapshot, StoreError};

const SNAPSHOT_FILE: &str = "snapshot.json";
const SECRETS_DIR: &str = "secrets";

pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    fn secret_path(&self, key: SecretKey) -> PathBuf {
        self.dir.join(SECRETS_DIR).join(key.as_str())
    }
}

async fn read_optional(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) => Some(s),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to read store file: {}", e);
            None
        }
    }
}

/// Writes `<path>.tmp` then renames it over `path`.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let display = path.display().to_string();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent.display().to_string(), e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| StoreError::io(tmp.display().to_string(), e))?;
    restrict_permissions(&tmp).await;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(display, e))
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) =
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
    {
        tracing::debug!(path = %path.display(), "could not restrict permissions: {}", e);
    }
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) {}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn load_snapshot(&self) -> Option<Snapshot> {
        let path = self.snapshot_path();
        let json = read_optional(&path).await?;
        match Snapshot::from_json(&json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable snapshot: {}", e);
                None
            }
        }
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = snapshot.to_json()?;
        write_atomic(&self.snapshot_path(), json.as_bytes()).await?;
        tracing::debug!(updated_at = snapshot.updated_at, "snapshot saved locally");
        Ok(())
    }

    async fn load_secret(&self, key: SecretKey) -> Option<String> {
        let value = read_optional(&self.secret_path(key)).await?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    async fn save_secret(&self, key: SecretKey, value: &str) -> Result<(), StoreError> {
        write_atomic(&self.secret_path(key), value.trim().as_bytes()).await
    }

    async fn clear_secret(&self, key: SecretKey) -> Result<(), StoreError> {
        let path = self.secret_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path.display().to_string(), e)),
        }
    }
}
