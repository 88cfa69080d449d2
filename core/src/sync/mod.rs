//! Local-first synchronization of the household snapshot.
//!
//! The coordinator keeps the in-memory snapshot authoritative, persists it to
//! a [`LocalStore`](crate::store::LocalStore) and, when configured, mirrors it
//! to a [`RemoteStore`](crate::store::RemoteStore) with last-writer-wins
//! reconciliation.

pub mod coordinator;
pub mod policy;
pub mod status;

pub use coordinator::SyncCoordinator;
pub use policy::{resolve, Reconciliation};
pub use status::SyncStatus;
