use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default hearth directory: ~/.hearth
pub fn get_hearth_dir() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".hearth"))
}

pub fn load_from_file(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    let cfg = toml::from_str::<AppConfig>(&s)?;
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.hearth/config.toml
    let hearth_dir = get_hearth_dir()?;
    let home_config = hearth_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if home_config.exists() {
        load_from_file(&home_config)?
    } else if local_config.exists() {
        load_from_file(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.logging.directory = Some(hearth_dir.join("logs").to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

/// Environment variable overrides (highest priority). Blank values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("HEARTH_DATA_DIR") {
        cfg.data_dir = v;
    }
    if let Some(v) = get("HEARTH_REMOTE_URL") {
        cfg.remote.base_url = v;
    }
    if let Some(v) = get("HEARTH_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = get("HEARTH_ACCESS_TOKEN") {
        cfg.access_token_override = Some(v.trim().to_string());
    }
}
