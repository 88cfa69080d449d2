//! Core of the hearth household finance tracker: the snapshot model, the
//! storage contracts and the local-first sync coordinator.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod sync;
pub mod util;
