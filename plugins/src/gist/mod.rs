//! GitHub Gist backed [`RemoteStore`](hearth_core::api::RemoteStore).

mod client;
mod error;
mod models;

pub use client::{GistRemoteStore, GistSettings};
pub use error::GistError;
