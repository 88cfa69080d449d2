//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `hearth_core::api` instead of reaching into internal modules.

pub use crate::config::{load_default, AppConfig, LoggingConfig, RemoteConfig};
pub use crate::error::{CliError, StoreError};
pub use crate::models::{
    Account, Frequency, Goal, HouseholdSummary, Investment, Member, Mortgage, Outgoing, Snapshot,
};
pub use crate::store::{LocalStore, RemoteStore, SecretKey};
pub use crate::sync::{SyncCoordinator, SyncStatus};
pub use crate::util::{Clock, SystemClock};
