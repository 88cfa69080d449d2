pub mod factory;
pub mod gist;
pub mod store;
