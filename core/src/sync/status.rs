use serde::Serialize;

/// Outcome of the most recent sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    /// No remote store is configured. Not an error.
    NotConfigured,
    Success(String),
    Error(String),
}

impl SyncStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(m) | Self::Error(m) => Some(m),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Syncing => f.write_str("syncing"),
            Self::NotConfigured => f.write_str("not configured"),
            Self::Success(m) => write!(f, "success: {m}"),
            Self::Error(m) => write!(f, "error: {m}"),
        }
    }
}

pub const MSG_NO_DATA: &str = "no data to sync";
pub const MSG_UPLOADED: &str = "uploaded";
pub const MSG_DOWNLOADED: &str = "downloaded";
pub const MSG_UPDATED_FROM_CLOUD: &str = "updated from cloud";
pub const MSG_ALREADY_IN_SYNC: &str = "already in sync";
pub const MSG_SAVED_TO_CLOUD: &str = "saved to cloud";
pub const MSG_REFRESHED_FROM_CLOUD: &str = "refreshed from cloud";
pub const MSG_NO_CLOUD_DATA: &str = "no data in cloud";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_message() {
        assert_eq!(SyncStatus::Idle.to_string(), "idle");
        assert_eq!(
            SyncStatus::success(MSG_UPLOADED).to_string(),
            "success: uploaded"
        );
        assert_eq!(SyncStatus::error("boom").message(), Some("boom"));
        assert_eq!(SyncStatus::NotConfigured.message(), None);
        assert!(!SyncStatus::NotConfigured.is_error());
    }

    #[test]
    fn serializes_with_state_tag() {
        let v = serde_json::to_value(SyncStatus::success(MSG_DOWNLOADED)).unwrap();
        assert_eq!(v["state"], "success");
        assert_eq!(v["message"], "downloaded");
        let v = serde_json::to_value(SyncStatus::NotConfigured).unwrap();
        assert_eq!(v["state"], "not_configured");
    }
}
