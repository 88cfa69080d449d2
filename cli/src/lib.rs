//! hearth-cli library: command surface and handlers, exposed for tests.

pub mod commands;
pub mod context;
