mod load;
mod types;

pub use load::{apply_env_overrides, get_hearth_dir, load_default, load_from_file};
pub use types::{AppConfig, LoggingConfig, RemoteConfig};
