#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use hearth_core::api::{Clock, LocalStore, RemoteStore, SecretKey, Snapshot, StoreError};

pub fn snapshot_at(updated_at: i64) -> Snapshot {
    Snapshot {
        updated_at,
        ..Default::default()
    }
}

#[derive(Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn at(now: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now),
        })
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MemoryLocalStore {
    snapshot: Mutex<Option<Snapshot>>,
    secrets: Mutex<HashMap<SecretKey, String>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryLocalStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Arc<Self> {
        let store = Self::default();
        *store.snapshot.lock().unwrap() = Some(snapshot);
        Arc::new(store)
    }

    pub fn stored(&self) -> Option<Snapshot> {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn secret(&self, key: SecretKey) -> Option<String> {
        self.secrets.lock().unwrap().get(&key).cloned()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn write_error(&self) -> Option<StoreError> {
        self.fail_writes.load(Ordering::SeqCst).then(|| {
            StoreError::io(
                "memory",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            )
        })
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn load_snapshot(&self) -> Option<Snapshot> {
        self.stored()
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(e) = self.write_error() {
            return Err(e);
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    async fn load_secret(&self, key: SecretKey) -> Option<String> {
        self.secret(key)
    }

    async fn save_secret(&self, key: SecretKey, value: &str) -> Result<(), StoreError> {
        if let Some(e) = self.write_error() {
            return Err(e);
        }
        self.secrets.lock().unwrap().insert(key, value.to_string());
        Ok(())
    }

    async fn clear_secret(&self, key: SecretKey) -> Result<(), StoreError> {
        if let Some(e) = self.write_error() {
            return Err(e);
        }
        self.secrets.lock().unwrap().remove(&key);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockRemote {
    snapshot: Mutex<Option<Snapshot>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    loads: AtomicUsize,
    saves: AtomicUsize,
    /// When set, `load_snapshot` waits for a notification before answering.
    gate: Option<Arc<Notify>>,
}

impl MockRemote {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Arc<Self> {
        let remote = Self::default();
        *remote.snapshot.lock().unwrap() = Some(snapshot);
        Arc::new(remote)
    }

    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Default::default()
        })
    }

    pub fn stored(&self) -> Option<Snapshot> {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn load_snapshot(&self) -> Result<Option<Snapshot>, anyhow::Error> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_loads.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(self.stored())
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), anyhow::Error> {
        if self.fail_saves.load(Ordering::SeqCst) {
            anyhow::bail!("401 bad credentials");
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}
