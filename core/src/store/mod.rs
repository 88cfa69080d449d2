//! Storage contracts consumed by the sync coordinator.

pub mod local;
pub mod remote;

pub use local::{LocalStore, SecretKey};
pub use remote::RemoteStore;
