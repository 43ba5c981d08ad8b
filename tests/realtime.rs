//! Live-update channel semantics: immediate initial push, per-tick error
//! frames, and — the one hard requirement — no store queries after the
//! channel is dropped.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use uuid::Uuid;

use folio::api::realtime;
use folio::errors::AppError;
use folio::models::activity::{Activity, ActivityFilter, ActivityPurgeFilter, NewActivity};
use folio::models::notification::{Category, NewNotification, Notification, NotificationFilter};
use folio::store::{MemStore, Page, PageRequest, Store};

/// Store wrapper that counts (and can fail) unread-snapshot queries while
/// delegating everything to an in-memory store.
struct CountingStore {
    inner: MemStore,
    snapshot_queries: AtomicUsize,
    fail_next: AtomicBool,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemStore::new(),
            snapshot_queries: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    fn queries(&self) -> usize {
        self.snapshot_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for CountingStore {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification, AppError> {
        self.inner.create_notification(new).await
    }

    async fn list_notifications(
        &self,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> Result<Page<Notification>, AppError> {
        self.inner.list_notifications(filter, page).await
    }

    async fn list_unread_notifications(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        self.snapshot_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("store offline")));
        }
        self.inner.list_unread_notifications(limit).await
    }

    async fn count_unread_notifications(&self) -> Result<u64, AppError> {
        self.inner.count_unread_notifications().await
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification, AppError> {
        self.inner.mark_notification_read(id).await
    }

    async fn mark_all_notifications_read(&self) -> Result<u64, AppError> {
        self.inner.mark_all_notifications_read().await
    }

    async fn delete_notification(&self, id: Uuid) -> Result<(), AppError> {
        self.inner.delete_notification(id).await
    }

    async fn clear_notifications(&self) -> Result<u64, AppError> {
        self.inner.clear_notifications().await
    }

    async fn record_activity(&self, new: NewActivity) -> Result<Activity, AppError> {
        self.inner.record_activity(new).await
    }

    async fn query_activity(
        &self,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> Result<Page<Activity>, AppError> {
        self.inner.query_activity(filter, page).await
    }

    async fn purge_activity(&self, filter: &ActivityPurgeFilter) -> Result<u64, AppError> {
        self.inner.purge_activity(filter).await
    }

    async fn purge_expired_activity(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        self.inner.purge_expired_activity(cutoff).await
    }
}

#[tokio::test]
async fn test_initial_push_is_immediate() {
    let store = Arc::new(CountingStore::new());
    store
        .create_notification(NewNotification::new("hello", Category::Blog))
        .await
        .unwrap();

    // A long tick interval must not delay the first snapshot.
    let mut stream = Box::pin(realtime::unread_snapshots(
        store.clone(),
        Duration::from_secs(3600),
    ));
    let first = tokio::time::timeout(Duration::from_millis(200), stream.next())
        .await
        .expect("initial push should not wait for the tick interval");
    assert!(first.is_some());
    assert_eq!(store.queries(), 1);
}

#[tokio::test]
async fn test_snapshot_contains_unread_set_and_timestamp() {
    let store = Arc::new(CountingStore::new());
    let n = store
        .create_notification(NewNotification::new("unread", Category::Contact))
        .await
        .unwrap();
    let read = store
        .create_notification(NewNotification::new("read", Category::Blog))
        .await
        .unwrap();
    store.mark_notification_read(read.id).await.unwrap();

    let snapshot = realtime::unread_snapshot(store.as_ref()).await;
    let items = snapshot["notifications"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], n.id.to_string());
    assert!(snapshot["timestamp"].is_string());
    assert!(snapshot.get("error").is_none());
}

#[tokio::test]
async fn test_failed_tick_emits_error_frame_and_channel_survives() {
    let store = Arc::new(CountingStore::new());
    store.fail_next.store(true, Ordering::SeqCst);

    let failed = realtime::unread_snapshot(store.as_ref()).await;
    assert_eq!(failed["error"], "snapshot unavailable");
    // The underlying failure text never reaches the client frame.
    assert!(!failed.to_string().contains("store offline"));

    // Next tick recovers without any reconnection.
    let ok = realtime::unread_snapshot(store.as_ref()).await;
    assert!(ok.get("error").is_none());
    assert!(ok["notifications"].is_array());
    assert_eq!(store.queries(), 2);
}

#[tokio::test]
async fn test_stream_error_tick_does_not_terminate_stream() {
    let store = Arc::new(CountingStore::new());
    store.fail_next.store(true, Ordering::SeqCst);

    let mut stream = Box::pin(realtime::unread_snapshots(
        store.clone(),
        Duration::from_millis(10),
    ));
    // First tick fails, second succeeds; both arrive as frames.
    assert!(stream.next().await.is_some());
    assert!(stream.next().await.is_some());
    assert_eq!(store.queries(), 2);
}

#[tokio::test]
async fn test_no_queries_after_channel_close() {
    let store = Arc::new(CountingStore::new());
    let tick = Duration::from_millis(10);

    let mut stream = Box::pin(realtime::unread_snapshots(store.clone(), tick));
    stream.next().await;
    stream.next().await;
    let seen = store.queries();
    assert!(seen >= 2);
    drop(stream);

    // Wait several tick intervals; the count must not move.
    tokio::time::sleep(tick * 10).await;
    assert_eq!(store.queries(), seen);
}

#[tokio::test]
async fn test_later_ticks_reflect_later_writes() {
    let store = Arc::new(CountingStore::new());
    let mut stream = Box::pin(realtime::unread_snapshots(
        store.clone(),
        Duration::from_millis(10),
    ));

    // Initial snapshot: empty store.
    stream.next().await;
    let empty = realtime::unread_snapshot(store.as_ref()).await;
    assert_eq!(empty["notifications"].as_array().unwrap().len(), 0);

    store
        .create_notification(NewNotification::new("new", Category::Project))
        .await
        .unwrap();

    // A subsequent tick sees the write; no notification-on-write needed.
    stream.next().await;
    let after = realtime::unread_snapshot(store.as_ref()).await;
    assert_eq!(after["notifications"].as_array().unwrap().len(), 1);
}
