//! Last-writer-wins reconciliation between the local and remote snapshot.
//!
//! Whole documents are compared by `updated_at` only; there is no field-level
//! merge, so concurrent offline edits on two devices keep just the newer one.

use crate::models::Snapshot;

use super::status::{
    MSG_ALREADY_IN_SYNC, MSG_DOWNLOADED, MSG_NO_DATA, MSG_UPDATED_FROM_CLOUD, MSG_UPLOADED,
};

/// What a reconcile pass should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Neither side has data.
    NothingToSync,
    /// Push the local snapshot.
    Upload,
    /// Adopt the remote snapshot; nothing was held locally.
    Download,
    /// Adopt the remote snapshot; it is newer than the local one.
    UpdateFromCloud,
    /// Same version on both sides.
    AlreadyInSync,
}

impl Reconciliation {
    pub fn message(self) -> &'static str {
        match self {
            Self::NothingToSync => MSG_NO_DATA,
            Self::Upload => MSG_UPLOADED,
            Self::Download => MSG_DOWNLOADED,
            Self::UpdateFromCloud => MSG_UPDATED_FROM_CLOUD,
            Self::AlreadyInSync => MSG_ALREADY_IN_SYNC,
        }
    }

    pub fn writes_remote(self) -> bool {
        matches!(self, Self::Upload)
    }

    pub fn writes_local(self) -> bool {
        matches!(self, Self::Download | Self::UpdateFromCloud)
    }
}

pub fn resolve(local: Option<&Snapshot>, remote: Option<&Snapshot>) -> Reconciliation {
    match (local, remote) {
        (None, None) => Reconciliation::NothingToSync,
        (Some(_), None) => Reconciliation::Upload,
        (None, Some(_)) => Reconciliation::Download,
        (Some(local), Some(remote)) => {
            if remote.updated_at > local.updated_at {
                Reconciliation::UpdateFromCloud
            } else if local.updated_at > remote.updated_at {
                Reconciliation::Upload
            } else {
                Reconciliation::AlreadyInSync
            }
        }
    }
}
