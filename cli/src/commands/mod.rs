pub mod cli;
pub mod data;
pub mod sync;

use hearth_core::api::{CliError, SyncStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Result<Self, CliError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::Command(format!("Unknown format: {}", other))),
        }
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Command(format!("failed to render json: {e}")))?;
    println!("{}", out);
    Ok(())
}

/// Cloud failures never fail a command; they are reported on stderr.
pub(crate) fn report_sync_problem(status: &SyncStatus) {
    if status.is_error() {
        eprintln!("warning: {}", status);
    }
}
