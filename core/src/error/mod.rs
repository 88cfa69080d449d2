#[allow(clippy::module_inception)]
pub mod error;
pub mod store;

pub use error::CliError;
pub use store::StoreError;
