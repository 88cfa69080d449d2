use std::sync::Arc;

use anyhow::Result;

use hearth_core::api::{AppConfig, LocalStore, RemoteStore, SecretKey, SyncCoordinator};

use crate::gist::{GistRemoteStore, GistSettings};
use crate::store::FileLocalStore;

pub fn build_local(cfg: &AppConfig) -> Arc<FileLocalStore> {
    Arc::new(FileLocalStore::new(cfg.data_dir_expanded()))
}

/// Remote store for the configured provider, or `None` when sync is
/// disabled or no access token is available.
pub async fn build_remote(
    cfg: &AppConfig,
    local: Arc<dyn LocalStore>,
) -> Result<Option<Arc<dyn RemoteStore>>> {
    if !cfg.remote.enabled {
        return Ok(None);
    }

    let token = match cfg.access_token_override.clone() {
        Some(token) => Some(token),
        None => local.load_secret(SecretKey::AccessToken).await,
    };
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        tracing::debug!(target: "hearth.sync", "no access token, cloud sync not configured");
        return Ok(None);
    };

    build_remote_with_token(cfg, local, token).map(Some)
}

pub fn build_remote_with_token(
    cfg: &AppConfig,
    local: Arc<dyn LocalStore>,
    token: String,
) -> Result<Arc<dyn RemoteStore>> {
    let settings = GistSettings::from_config(&cfg.remote, token);
    Ok(Arc::new(GistRemoteStore::new(settings, local)?))
}

pub async fn build_coordinator(cfg: &AppConfig) -> Result<SyncCoordinator> {
    let local: Arc<dyn LocalStore> = build_local(cfg);
    let remote = build_remote(cfg, Arc::clone(&local)).await?;
    Ok(SyncCoordinator::new(local, remote))
}
