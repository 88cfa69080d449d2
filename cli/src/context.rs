use std::sync::Arc;

use hearth_core::api::{AppConfig, CliError, LocalStore, SyncCoordinator};
use hearth_plugins::factory;

/// Everything a command needs: configuration, the local store and the
/// single coordinator built from them.
pub struct AppContext {
    cfg: AppConfig,
    local: Arc<dyn LocalStore>,
    coordinator: SyncCoordinator,
}

impl AppContext {
    pub async fn new(cfg: AppConfig) -> Result<Self, CliError> {
        let local: Arc<dyn LocalStore> = factory::build_local(&cfg);
        let remote = factory::build_remote(&cfg, Arc::clone(&local)).await?;
        let coordinator = SyncCoordinator::new(Arc::clone(&local), remote);
        Ok(Self {
            cfg,
            local,
            coordinator,
        })
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn local(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }
}
