//! Owner of the current snapshot.
//!
//! Every mutation goes through [`SyncCoordinator`]: it is published to
//! observers first, persisted to the local store second, and pushed to the
//! remote store last. Local state stays authoritative when the remote is
//! missing or failing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex, RwLock};

use crate::models::Snapshot;
use crate::store::{LocalStore, RemoteStore, SecretKey};
use crate::util::{next_stamp, Clock, SystemClock};

use super::policy;
use super::status::{SyncStatus, MSG_NO_CLOUD_DATA, MSG_REFRESHED_FROM_CLOUD, MSG_SAVED_TO_CLOUD};

/// Clears the in-flight flag when a reconcile pass ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SyncCoordinator {
    local: Arc<dyn LocalStore>,
    remote: RwLock<Option<Arc<dyn RemoteStore>>>,
    clock: Arc<dyn Clock>,
    /// Serializes operations that read then replace the snapshot.
    op_lock: Mutex<()>,
    reconciling: AtomicBool,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    status_tx: watch::Sender<SyncStatus>,
    loading_tx: watch::Sender<bool>,
}

impl SyncCoordinator {
    pub fn new(local: Arc<dyn LocalStore>, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(SyncStatus::Idle);
        let (loading_tx, _) = watch::channel(false);
        Self {
            local,
            remote: RwLock::new(remote),
            clock: Arc::new(SystemClock),
            op_lock: Mutex::new(()),
            reconciling: AtomicBool::new(false),
            snapshot_tx,
            status_tx,
            loading_tx,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn status(&self) -> SyncStatus {
        self.status_tx.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading_tx.borrow()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.snapshot_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading_tx.subscribe()
    }

    pub async fn has_remote(&self) -> bool {
        self.remote.read().await.is_some()
    }

    /// Install a remote store, e.g. after the user supplied credentials.
    pub async fn connect_remote(&self, remote: Arc<dyn RemoteStore>) {
        let _op = self.op_lock.lock().await;
        *self.remote.write().await = Some(remote);
        tracing::info!(target: "hearth.sync", "remote store connected");
    }

    /// Revoke sync credentials: drop the remote store and forget the token
    /// and the remote document id.
    pub async fn disconnect_remote(&self) {
        let _op = self.op_lock.lock().await;
        *self.remote.write().await = None;
        for key in SecretKey::ALL {
            if let Err(e) = self.local.clear_secret(key).await {
                tracing::warn!(target: "hearth.sync", secret = %key, "failed to clear secret: {}", e);
            }
        }
        self.set_status(SyncStatus::NotConfigured);
        tracing::info!(target: "hearth.sync", "remote store disconnected");
    }

    /// Load the cached snapshot and, when a remote store is configured,
    /// reconcile with it. `is_loading` is true for the duration.
    pub async fn initialize(&self) {
        self.loading_tx.send_replace(true);

        {
            let _op = self.op_lock.lock().await;
            match self.local.load_snapshot().await {
                Some(snapshot) => {
                    tracing::info!(
                        target: "hearth.sync",
                        updated_at = snapshot.updated_at,
                        "loaded cached snapshot"
                    );
                    self.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
                }
                None => tracing::info!(target: "hearth.sync", "no cached snapshot"),
            }
        }

        if self.has_remote().await {
            self.reconcile().await;
        }

        self.loading_tx.send_replace(false);
    }

    /// Reconcile with the remote store using last-writer-wins on `updated_at`.
    ///
    /// Returns the resulting status. A call made while another reconcile is
    /// in flight is skipped and returns the current status.
    pub async fn reconcile(&self) -> SyncStatus {
        let Some(_in_flight) = InFlight::try_acquire(&self.reconciling) else {
            tracing::warn!(target: "hearth.sync", "Sync already in progress, skipping");
            return self.status();
        };
        let _op = self.op_lock.lock().await;

        let Some(remote) = self.remote.read().await.clone() else {
            return self.set_status(SyncStatus::NotConfigured);
        };
        self.set_status(SyncStatus::Syncing);

        let start = std::time::Instant::now();
        let remote_snapshot = match remote.load_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(target: "hearth.sync", "cloud load failed: {:#}", e);
                return self.set_status(SyncStatus::error(format!("cloud load failed: {e}")));
            }
        };

        let local_snapshot = self.snapshot();
        let decision = policy::resolve(local_snapshot.as_deref(), remote_snapshot.as_ref());
        tracing::debug!(
            target: "hearth.sync",
            local_updated_at = local_snapshot.as_ref().map(|s| s.updated_at),
            remote_updated_at = remote_snapshot.as_ref().map(|s| s.updated_at),
            decision = ?decision,
            "reconcile decision"
        );

        if decision.writes_remote() {
            if let Some(local) = local_snapshot {
                if let Err(e) = remote.save_snapshot(&local).await {
                    tracing::error!(target: "hearth.sync", "cloud upload failed: {:#}", e);
                    return self.set_status(SyncStatus::error(format!("cloud upload failed: {e}")));
                }
            }
        } else if decision.writes_local() {
            if let Some(remote) = remote_snapshot {
                self.adopt(remote).await;
            }
        }

        tracing::info!(
            target: "hearth.sync",
            "Sync completed ({}) in {:?}",
            decision.message(),
            start.elapsed()
        );
        self.set_status(SyncStatus::success(decision.message()))
    }

    /// Pull the remote snapshot and adopt it regardless of timestamps.
    pub async fn force_refresh_from_cloud(&self) -> SyncStatus {
        let Some(_in_flight) = InFlight::try_acquire(&self.reconciling) else {
            tracing::warn!(target: "hearth.sync", "Sync already in progress, skipping");
            return self.status();
        };
        let _op = self.op_lock.lock().await;

        let Some(remote) = self.remote.read().await.clone() else {
            return self.set_status(SyncStatus::NotConfigured);
        };
        self.set_status(SyncStatus::Syncing);

        match remote.load_snapshot().await {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    target: "hearth.sync",
                    updated_at = snapshot.updated_at,
                    "replacing local snapshot with cloud copy"
                );
                self.adopt(snapshot).await;
                self.set_status(SyncStatus::success(MSG_REFRESHED_FROM_CLOUD))
            }
            Ok(None) => self.set_status(SyncStatus::success(MSG_NO_CLOUD_DATA)),
            Err(e) => {
                tracing::error!(target: "hearth.sync", "cloud refresh failed: {:#}", e);
                self.set_status(SyncStatus::error(format!("cloud refresh failed: {e}")))
            }
        }
    }

    /// Apply `transform` to the current snapshot (or a default one) and commit
    /// the result. `updated_at` is always stamped here, whatever the transform
    /// returned.
    pub async fn update_data<F>(&self, transform: F) -> Arc<Snapshot>
    where
        F: FnOnce(Snapshot) -> Snapshot + Send,
    {
        let _op = self.op_lock.lock().await;
        let previous = self.snapshot();
        let base = previous.as_deref().cloned().unwrap_or_default();
        let updated = transform(base);
        self.commit(updated, previous.map(|s| s.updated_at)).await
    }

    /// Replace the current snapshot wholesale, e.g. during onboarding.
    pub async fn set_data(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let _op = self.op_lock.lock().await;
        let previous = self.snapshot().map(|s| s.updated_at);
        self.commit(snapshot, previous).await
    }

    async fn commit(&self, mut snapshot: Snapshot, previous_stamp: Option<i64>) -> Arc<Snapshot> {
        snapshot.updated_at = next_stamp(self.clock.now_millis(), previous_stamp);
        let snapshot = Arc::new(snapshot);
        self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));

        self.persist(&snapshot).await;

        let remote = self.remote.read().await.clone();
        if let Some(remote) = remote {
            self.set_status(SyncStatus::Syncing);
            match remote.save_snapshot(&snapshot).await {
                Ok(()) => {
                    self.set_status(SyncStatus::success(MSG_SAVED_TO_CLOUD));
                }
                Err(e) => {
                    tracing::error!(target: "hearth.sync", "cloud save failed: {:#}", e);
                    self.set_status(SyncStatus::error(format!("cloud save failed: {e}")));
                }
            }
        }

        snapshot
    }

    async fn adopt(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));
        self.persist(&snapshot).await;
    }

    async fn persist(&self, snapshot: &Snapshot) {
        if let Err(e) = self.local.save_snapshot(snapshot).await {
            tracing::warn!(target: "hearth.sync", "failed to persist snapshot locally: {}", e);
        }
    }

    fn set_status(&self, status: SyncStatus) -> SyncStatus {
        tracing::debug!(target: "hearth.sync", status = %status, "sync status changed");
        self.status_tx.send_replace(status.clone());
        status
    }
}
