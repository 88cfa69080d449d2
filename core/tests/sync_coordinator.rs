mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio::sync::Notify;

use common::{snapshot_at, ManualClock, MemoryLocalStore, MockRemote};
use hearth_core::api::{
    LocalStore, Member, RemoteStore, SecretKey, Snapshot, SyncCoordinator, SyncStatus,
};

fn coordinator(
    local: &Arc<MemoryLocalStore>,
    remote: Option<&Arc<MockRemote>>,
    clock: &Arc<ManualClock>,
) -> SyncCoordinator {
    let local: Arc<dyn LocalStore> = local.clone();
    let remote = remote.map(|r| r.clone() as Arc<dyn RemoteStore>);
    SyncCoordinator::new(local, remote).with_clock(clock.clone())
}

#[tokio::test]
async fn empty_store_without_remote_initializes_to_nothing() {
    let local = MemoryLocalStore::empty();
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, None, &clock);

    c.initialize().await;

    assert!(c.snapshot().is_none());
    assert!(!c.is_loading());
    assert_eq!(c.status(), SyncStatus::Idle);
}

#[tokio::test]
async fn local_edits_work_without_remote() {
    let local = MemoryLocalStore::empty();
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, None, &clock);
    c.initialize().await;

    let updated = c
        .update_data(|mut s| {
            s.members.push(Member::new("Ann", 2_000.0));
            s
        })
        .await;

    assert_eq!(updated.members.len(), 1);
    assert_eq!(c.snapshot().unwrap().members[0].name, "Ann");
    assert_eq!(local.stored().unwrap().members.len(), 1);
    assert_eq!(c.status(), SyncStatus::Idle);

    assert_eq!(c.reconcile().await, SyncStatus::NotConfigured);
    assert_eq!(c.force_refresh_from_cloud().await, SyncStatus::NotConfigured);
    assert!(!c.status().is_error());
}

#[tokio::test]
async fn update_timestamps_increase_even_when_clock_stalls() {
    let local = MemoryLocalStore::empty();
    let clock = ManualClock::at(5_000);
    let c = coordinator(&local, None, &clock);

    let mut last = i64::MIN;
    for i in 0..5 {
        let s = c
            .update_data(move |mut s| {
                s.household_name = format!("rev {i}");
                s
            })
            .await;
        assert!(s.updated_at > last, "{} <= {}", s.updated_at, last);
        last = s.updated_at;
    }

    clock.set(10);
    let s = c.update_data(|s| s).await;
    assert!(s.updated_at > last);

    clock.set(9_000);
    let s = c.update_data(|s| s).await;
    assert_eq!(s.updated_at, 9_000);
}

#[tokio::test]
async fn caller_cannot_set_updated_at() {
    let local = MemoryLocalStore::empty();
    let clock = ManualClock::at(1_234);
    let c = coordinator(&local, None, &clock);

    let s = c
        .update_data(|mut s| {
            s.updated_at = 9_999_999;
            s
        })
        .await;
    assert_eq!(s.updated_at, 1_234);

    let s = c.set_data(snapshot_at(i64::MAX - 10)).await;
    assert_eq!(s.updated_at, 1_235);
}

#[tokio::test]
async fn reconcile_adopts_newer_remote() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(100));
    let remote = MockRemote::with_snapshot(snapshot_at(200));
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);

    c.initialize().await;

    assert_eq!(c.snapshot().unwrap().updated_at, 200);
    assert_eq!(local.stored().unwrap().updated_at, 200);
    assert_eq!(c.status(), SyncStatus::success("updated from cloud"));
    assert_eq!(remote.saves(), 0);
}

#[tokio::test]
async fn reconcile_uploads_newer_local() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(300));
    let remote = MockRemote::with_snapshot(snapshot_at(200));
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);

    c.initialize().await;

    assert_eq!(c.status(), SyncStatus::success("uploaded"));
    assert_eq!(remote.stored().unwrap().updated_at, 300);
    assert_eq!(c.snapshot().unwrap().updated_at, 300);
    assert_eq!(local.saves(), 0);
}

#[tokio::test]
async fn reconcile_with_equal_timestamps_writes_nothing() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(300));
    let remote = MockRemote::with_snapshot(snapshot_at(300));
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);

    c.initialize().await;

    assert_eq!(c.status(), SyncStatus::success("already in sync"));
    assert_eq!(remote.saves(), 0);
    assert_eq!(local.saves(), 0);
}

#[tokio::test]
async fn reconcile_with_nothing_anywhere() {
    let local = MemoryLocalStore::empty();
    let remote = MockRemote::empty();
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);

    c.initialize().await;

    assert!(c.snapshot().is_none());
    assert_eq!(c.status(), SyncStatus::success("no data to sync"));
    assert_eq!(remote.saves(), 0);
    assert_eq!(local.saves(), 0);
}

#[tokio::test]
async fn initialize_downloads_when_only_remote_has_data() {
    let local = MemoryLocalStore::empty();
    let mut cloud = snapshot_at(500);
    cloud.household_name = "From another device".to_string();
    let remote = MockRemote::with_snapshot(cloud.clone());
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);

    c.initialize().await;

    assert_eq!(*c.snapshot().unwrap(), cloud);
    assert_eq!(local.stored(), Some(cloud));
    assert_eq!(c.status(), SyncStatus::success("downloaded"));
    assert!(!c.is_loading());
}

#[tokio::test]
async fn remote_load_failure_leaves_state_untouched() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(100));
    let remote = MockRemote::with_snapshot(snapshot_at(200));
    remote.fail_loads(true);
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);

    c.initialize().await;
    let before = c.snapshot().unwrap();

    let status = c.reconcile().await;

    assert!(status.is_error(), "{status:?}");
    assert!(status.message().unwrap().contains("connection refused"));
    let after = c.snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(*after, *before);
    assert_eq!(local.saves(), 0);
    assert_eq!(remote.saves(), 0);
    assert!(!c.is_loading());
}

#[tokio::test]
async fn identity_update_then_reconcile_is_already_in_sync() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(100));
    let remote = MockRemote::with_snapshot(snapshot_at(100));
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);
    c.initialize().await;

    c.update_data(|s| s).await;
    assert_eq!(c.status(), SyncStatus::success("saved to cloud"));
    assert_eq!(remote.saves(), 1);

    assert_eq!(c.reconcile().await, SyncStatus::success("already in sync"));
    assert_eq!(remote.saves(), 1);
}

#[tokio::test]
async fn failed_push_keeps_local_edit_and_uploads_on_next_sync() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(100));
    let remote = MockRemote::with_snapshot(snapshot_at(50));
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);
    c.initialize().await;
    // Local was newer, so the first reconcile uploaded it.
    assert_eq!(remote.stored().unwrap().updated_at, 100);

    remote.fail_saves(true);
    let updated = c
        .update_data(|mut s| {
            s.members.push(Member::new("New member", 1_500.0));
            s
        })
        .await;

    assert!(c.snapshot().unwrap().members.iter().any(|m| m.name == "New member"));
    assert!(c.status().is_error());
    assert_eq!(local.stored().unwrap(), *updated);
    assert_eq!(remote.stored().unwrap().updated_at, 100);

    remote.fail_saves(false);
    assert_eq!(c.reconcile().await, SyncStatus::success("uploaded"));
    assert_eq!(remote.stored().unwrap(), *updated);
}

#[tokio::test]
async fn failed_upload_during_reconcile_is_an_error() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(300));
    let remote = MockRemote::empty();
    remote.fail_saves(true);
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);

    c.initialize().await;

    assert!(c.status().is_error());
    assert_eq!(c.snapshot().unwrap().updated_at, 300);
}

#[tokio::test]
async fn local_write_failure_is_swallowed() {
    let local = MemoryLocalStore::empty();
    local.fail_writes(true);
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, None, &clock);

    let s = c
        .update_data(|mut s| {
            s.household_name = "Offline".to_string();
            s
        })
        .await;

    assert_eq!(s.household_name, "Offline");
    assert_eq!(c.snapshot().unwrap().household_name, "Offline");
    assert!(local.stored().is_none());
    assert_eq!(c.status(), SyncStatus::Idle);
}

#[tokio::test]
async fn force_refresh_adopts_older_remote() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(900));
    let remote = MockRemote::empty();
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);
    c.initialize().await;
    assert_eq!(c.status(), SyncStatus::success("uploaded"));

    let mut older = snapshot_at(10);
    older.household_name = "old copy".to_string();
    remote.save_snapshot(&older).await.unwrap();

    assert_eq!(
        c.force_refresh_from_cloud().await,
        SyncStatus::success("refreshed from cloud")
    );
    assert_eq!(*c.snapshot().unwrap(), older);
    assert_eq!(local.stored(), Some(older));
}

#[tokio::test]
async fn force_refresh_failure_and_empty_cloud_keep_state() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(900));
    let remote = MockRemote::empty();
    let clock = ManualClock::at(1_000);
    let c = SyncCoordinator::new(local.clone(), None).with_clock(clock.clone());
    c.initialize().await;
    c.connect_remote(remote.clone()).await;

    assert_eq!(
        c.force_refresh_from_cloud().await,
        SyncStatus::success("no data in cloud")
    );
    assert_eq!(c.snapshot().unwrap().updated_at, 900);

    remote.fail_loads(true);
    assert!(c.force_refresh_from_cloud().await.is_error());
    assert_eq!(c.snapshot().unwrap().updated_at, 900);
    assert_eq!(local.saves(), 0);
}

#[tokio::test]
async fn connect_then_reconcile_uploads() {
    let local = MemoryLocalStore::with_snapshot(snapshot_at(100));
    let remote = MockRemote::empty();
    let clock = ManualClock::at(1_000);
    let c = SyncCoordinator::new(local.clone(), None).with_clock(clock.clone());
    c.initialize().await;
    assert!(!c.has_remote().await);

    c.connect_remote(remote.clone()).await;
    assert!(c.has_remote().await);
    assert_eq!(c.reconcile().await, SyncStatus::success("uploaded"));
    assert_eq!(remote.stored().unwrap().updated_at, 100);
}

#[tokio::test]
async fn disconnect_clears_credentials_and_stops_pushing() {
    let local = MemoryLocalStore::empty();
    local
        .save_secret(SecretKey::AccessToken, "ghp_token")
        .await
        .unwrap();
    local
        .save_secret(SecretKey::RemoteDocumentId, "abc123")
        .await
        .unwrap();
    let remote = MockRemote::empty();
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, Some(&remote), &clock);

    c.disconnect_remote().await;

    assert_eq!(c.status(), SyncStatus::NotConfigured);
    assert!(!c.has_remote().await);
    assert_eq!(local.secret(SecretKey::AccessToken), None);
    assert_eq!(local.secret(SecretKey::RemoteDocumentId), None);

    c.update_data(|s| s).await;
    assert_eq!(remote.saves(), 0);
    assert_eq!(c.status(), SyncStatus::NotConfigured);
}

#[tokio::test]
async fn set_data_commits_like_update() {
    let local = MemoryLocalStore::empty();
    let remote = MockRemote::empty();
    let clock = ManualClock::at(2_000);
    let c = coordinator(&local, Some(&remote), &clock);

    let mut onboarding = Snapshot::default();
    onboarding.household_name = "Smiths".to_string();
    onboarding.members.push(Member::new("Ann", 1_000.0));

    let s = c.set_data(onboarding).await;

    assert_eq!(s.updated_at, 2_000);
    assert_eq!(c.snapshot().unwrap().household_name, "Smiths");
    assert_eq!(local.stored().unwrap(), *s);
    assert_eq!(remote.stored().unwrap(), *s);
    assert_eq!(c.status(), SyncStatus::success("saved to cloud"));
}

#[tokio::test]
async fn observers_see_commits_in_order_and_late_subscribers_see_latest() {
    let local = MemoryLocalStore::empty();
    let clock = ManualClock::at(1_000);
    let c = coordinator(&local, None, &clock);

    let mut early = c.subscribe_snapshot();
    assert!(early.borrow_and_update().is_none());

    c.update_data(|mut s| {
        s.household_name = "first".to_string();
        s
    })
    .await;
    assert!(early.has_changed().unwrap());
    assert_eq!(
        early.borrow_and_update().as_ref().unwrap().household_name,
        "first"
    );

    c.update_data(|mut s| {
        s.household_name = "second".to_string();
        s
    })
    .await;

    let late = c.subscribe_snapshot();
    assert_eq!(late.borrow().as_ref().unwrap().household_name, "second");
    assert_eq!(
        early.borrow_and_update().as_ref().unwrap().household_name,
        "second"
    );
}

#[tokio::test]
async fn overlapping_reconcile_is_skipped() {
    let gate = Arc::new(Notify::new());
    let local = MemoryLocalStore::with_snapshot(snapshot_at(100));
    let remote = MockRemote::gated(gate.clone());
    let clock = ManualClock::at(1_000);
    let c = Arc::new(coordinator(&local, None, &clock));
    c.initialize().await;
    c.connect_remote(remote.clone()).await;

    let mut status_rx = c.subscribe_status();
    let first = {
        let c = Arc::clone(&c);
        tokio::spawn(async move { c.reconcile().await })
    };
    status_rx.wait_for(|s| s.is_syncing()).await.unwrap();

    let second = c.reconcile().await;
    assert_eq!(second, SyncStatus::Syncing);

    gate.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first, SyncStatus::success("uploaded"));
    assert_eq!(remote.loads(), 1);
    assert_eq!(remote.saves(), 1);
}

#[tokio::test]
async fn initialize_reports_loading_until_reconcile_finishes() {
    let gate = Arc::new(Notify::new());
    let local = MemoryLocalStore::with_snapshot(snapshot_at(100));
    let remote = MockRemote::gated(gate.clone());
    let clock = ManualClock::at(1_000);
    let c = Arc::new(coordinator(&local, Some(&remote), &clock));
    assert!(!c.is_loading());

    let mut loading_rx = c.subscribe_loading();
    let mut status_rx = c.subscribe_status();
    let init = {
        let c = Arc::clone(&c);
        tokio::spawn(async move { c.initialize().await })
    };
    status_rx.wait_for(|s| s.is_syncing()).await.unwrap();
    assert!(c.is_loading());
    assert!(*loading_rx.borrow_and_update());
    // The cached snapshot is visible while the remote is still pending.
    assert_eq!(c.snapshot().unwrap().updated_at, 100);

    gate.notify_one();
    init.await.unwrap();
    loading_rx.wait_for(|loading| !*loading).await.unwrap();
    assert!(!c.is_loading());
    assert_eq!(c.status(), SyncStatus::success("uploaded"));
}

#[tokio::test]
async fn initialize_clears_loading_when_remote_load_fails() {
    let gate = Arc::new(Notify::new());
    let local = MemoryLocalStore::with_snapshot(snapshot_at(100));
    let remote = MockRemote::gated(gate.clone());
    remote.fail_loads(true);
    let clock = ManualClock::at(1_000);
    let c = Arc::new(coordinator(&local, Some(&remote), &clock));

    let mut loading_rx = c.subscribe_loading();
    let init = {
        let c = Arc::clone(&c);
        tokio::spawn(async move { c.initialize().await })
    };
    loading_rx.wait_for(|loading| *loading).await.unwrap();

    gate.notify_one();
    init.await.unwrap();
    assert!(!c.is_loading());
    assert!(!*loading_rx.borrow_and_update());
    assert!(c.status().is_error());
    assert_eq!(c.snapshot().unwrap().updated_at, 100);
}
