use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the cached snapshot and secrets. `~` is expanded.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    /// Access token supplied through the environment. Never written to disk
    /// by the config loader; the secret store is the usual source.
    #[serde(skip)]
    pub access_token_override: Option<String>,
}

fn default_data_dir() -> String {
    "~/.hearth/data".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            logging: LoggingConfig::default(),
            remote: RemoteConfig::default(),
            access_token_override: None,
        }
    }
}

impl AppConfig {
    pub fn data_dir_expanded(&self) -> String {
        shellexpand::tilde(&self.data_dir).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "hearth.sync=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Gist-style document store used for cross-device sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Sync is only attempted when enabled and a token is available.
    #[serde(default = "default_remote_enabled")]
    pub enabled: bool,

    #[serde(default = "default_remote_url")]
    pub base_url: String,

    /// Description used to discover the document when no id is cached.
    #[serde(default = "default_remote_label")]
    pub label: String,

    /// File name of the snapshot inside the remote document.
    #[serde(default = "default_remote_file_name")]
    pub file_name: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_remote_enabled() -> bool {
    true
}

fn default_remote_url() -> String {
    "https://api.github.com".to_string()
}

fn default_remote_label() -> String {
    "hearth-finance-data".to_string()
}

fn default_remote_file_name() -> String {
    "hearth.json".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_user_agent() -> String {
    concat!("hearth/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: default_remote_enabled(),
            base_url: default_remote_url(),
            label: default_remote_label(),
            file_name: default_remote_file_name(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}
