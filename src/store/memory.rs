//! In-memory `Store`. Backs the integration tests and `folio serve` runs
//! without a DATABASE_URL. Same observable contract as `PgStore`: bulk
//! mutations are applied atomically under one lock acquisition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use super::{Page, PageRequest, Pagination, Store};
use crate::errors::AppError;
use crate::models::activity::{Activity, ActivityFilter, ActivityPurgeFilter, NewActivity};
use crate::models::notification::{NewNotification, Notification, NotificationFilter};

#[derive(Default)]
struct Inner {
    notifications: Vec<Notification>,
    activities: Vec<Activity>,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Same ordering as the SQL `ORDER BY created_at DESC, id`: the id tiebreak
// keeps page boundaries stable when two records share a timestamp.
fn newest_first<T, F: Fn(&T) -> (DateTime<Utc>, Uuid)>(items: &mut [&T], key: F) {
    items.sort_by(|a, b| {
        let (created_a, id_a) = key(a);
        let (created_b, id_b) = key(b);
        created_b.cmp(&created_a).then(id_a.cmp(&id_b))
    });
}

#[async_trait]
impl Store for MemStore {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification, AppError> {
        let n = new.materialize()?;
        let mut inner = self.inner.lock().unwrap();
        inner.notifications.push(n.clone());
        Ok(n)
    }

    async fn list_notifications(
        &self,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> Result<Page<Notification>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut matched: Vec<&Notification> = inner
            .notifications
            .iter()
            .filter(|n| filter.matches(n))
            .collect();
        newest_first(&mut matched, |n| (n.created_at, n.id));

        let total = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            pagination: Pagination::compute(total, page),
        })
    }

    async fn list_unread_notifications(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut unread: Vec<&Notification> =
            inner.notifications.iter().filter(|n| !n.read).collect();
        newest_first(&mut unread, |n| (n.created_at, n.id));
        Ok(unread.into_iter().take(limit as usize).cloned().collect())
    }

    async fn count_unread_notifications(&self) -> Result<u64, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.notifications.iter().filter(|n| !n.read).count() as u64)
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let n = inner
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(AppError::NotFound("notification"))?;
        n.read = true;
        Ok(n.clone())
    }

    async fn mark_all_notifications_read(&self) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let mut modified = 0;
        for n in inner.notifications.iter_mut().filter(|n| !n.read) {
            n.read = true;
            modified += 1;
        }
        Ok(modified)
    }

    async fn delete_notification(&self, id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.notifications.len();
        inner.notifications.retain(|n| n.id != id);
        if inner.notifications.len() == before {
            return Err(AppError::NotFound("notification"));
        }
        Ok(())
    }

    async fn clear_notifications(&self) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let deleted = inner.notifications.len() as u64;
        inner.notifications.clear();
        Ok(deleted)
    }

    async fn record_activity(&self, new: NewActivity) -> Result<Activity, AppError> {
        let a = new.materialize()?;
        let mut inner = self.inner.lock().unwrap();
        inner.activities.push(a.clone());
        Ok(a)
    }

    async fn query_activity(
        &self,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> Result<Page<Activity>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut matched: Vec<&Activity> =
            inner.activities.iter().filter(|a| filter.matches(a)).collect();
        newest_first(&mut matched, |a| (a.created_at, a.id));

        let total = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            pagination: Pagination::compute(total, page),
        })
    }

    async fn purge_activity(&self, filter: &ActivityPurgeFilter) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.activities.len();
        inner.activities.retain(|a| !filter.matches(a));
        Ok((before - inner.activities.len()) as u64)
    }

    async fn purge_expired_activity(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.activities.len();
        inner.activities.retain(|a| a.created_at >= cutoff);
        Ok((before - inner.activities.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::{ActivityAction, ActivityType};
    use crate::models::notification::{Category, Importance};

    #[tokio::test]
    async fn test_mark_all_read_is_idempotent() {
        let store = MemStore::new();
        for i in 0..3 {
            store
                .create_notification(NewNotification::new(format!("n{i}"), Category::System))
                .await
                .unwrap();
        }
        assert_eq!(store.mark_all_notifications_read().await.unwrap(), 3);
        assert_eq!(store.count_unread_notifications().await.unwrap(), 0);
        assert_eq!(store.mark_all_notifications_read().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pagination_concatenation_covers_all_items_once() {
        let store = MemStore::new();
        for i in 0..23 {
            store
                .create_notification(NewNotification::new(format!("n{i}"), Category::Blog))
                .await
                .unwrap();
        }

        let filter = NotificationFilter::default();
        let mut seen = std::collections::HashSet::new();
        let mut last_created: Option<chrono::DateTime<Utc>> = None;
        let mut page = 1;
        loop {
            let p = store
                .list_notifications(&filter, PageRequest::new(Some(page), Some(5)))
                .await
                .unwrap();
            for n in &p.items {
                assert!(seen.insert(n.id), "duplicate across pages");
                if let Some(prev) = last_created {
                    assert!(n.created_at <= prev, "not descending");
                }
                last_created = Some(n.created_at);
            }
            if !p.pagination.has_more {
                assert_eq!(p.pagination.total, 23);
                break;
            }
            page += 1;
        }
        assert_eq!(seen.len(), 23);
    }

    #[tokio::test]
    async fn test_page_boundaries_stable_with_equal_timestamps() {
        let store = MemStore::new();
        let stamp = Utc::now();
        for i in 0..5 {
            store
                .create_notification(NewNotification::new(format!("n{i}"), Category::Blog))
                .await
                .unwrap();
        }
        // Collapse every record onto one timestamp so only the id tiebreak
        // can keep the ordering deterministic.
        {
            let mut inner = store.inner.lock().unwrap();
            for n in inner.notifications.iter_mut() {
                n.created_at = stamp;
            }
        }

        let filter = NotificationFilter::default();
        let mut seen = std::collections::HashSet::new();
        let mut last_id = None;
        for page in 1..=3 {
            let p = store
                .list_notifications(&filter, PageRequest::new(Some(page), Some(2)))
                .await
                .unwrap();
            for n in &p.items {
                assert!(seen.insert(n.id), "duplicate at a page boundary");
                if let Some(prev) = last_id {
                    assert!(n.id > prev, "id tiebreak not ascending");
                }
                last_id = Some(n.id);
            }
        }
        assert_eq!(seen.len(), 5);
    }

    #[tokio::test]
    async fn test_category_filter_and_unread_scenario() {
        let store = MemStore::new();
        let a = store
            .create_notification(
                NewNotification::new("A", Category::Blog).importance(Importance::High),
            )
            .await
            .unwrap();
        store
            .create_notification(NewNotification::new("B", Category::Contact))
            .await
            .unwrap();

        let filter = NotificationFilter {
            category: Some(Category::Blog),
            ..Default::default()
        };
        let page = store
            .list_notifications(&filter, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, a.id);

        assert_eq!(store.count_unread_notifications().await.unwrap(), 2);
        store.mark_notification_read(a.id).await.unwrap();
        assert_eq!(store.count_unread_notifications().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_missing_id_leaves_unread_count() {
        let store = MemStore::new();
        store
            .create_notification(NewNotification::new("x", Category::Project))
            .await
            .unwrap();
        let err = store.mark_notification_read(Uuid::new_v4()).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
        assert_eq!(store.count_unread_notifications().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_retention_cutoff_with_injected_clock() {
        let store = MemStore::new();
        let fresh = store
            .record_activity(NewActivity::new(
                ActivityType::Blog,
                ActivityAction::Create,
                "fresh",
            ))
            .await
            .unwrap();
        // Backdate one record past the retention window.
        {
            let mut inner = store.inner.lock().unwrap();
            let old = inner.activities[0].clone();
            let mut old = Activity {
                id: Uuid::new_v4(),
                created_at: old.created_at - chrono::Duration::days(8),
                ..old
            };
            old.title = "stale".into();
            inner.activities.push(old);
        }

        let cutoff = Utc::now() - chrono::Duration::days(7);
        assert_eq!(store.purge_expired_activity(cutoff).await.unwrap(), 1);

        let page = store
            .query_activity(&ActivityFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, fresh.id);
    }

    #[tokio::test]
    async fn test_purge_by_filter() {
        let store = MemStore::new();
        store
            .record_activity(NewActivity::new(
                ActivityType::Blog,
                ActivityAction::Delete,
                "b",
            ))
            .await
            .unwrap();
        store
            .record_activity(NewActivity::new(
                ActivityType::System,
                ActivityAction::Login,
                "s",
            ))
            .await
            .unwrap();

        let filter = ActivityPurgeFilter {
            entity: Some(ActivityType::Blog),
            ..Default::default()
        };
        assert_eq!(store.purge_activity(&filter).await.unwrap(), 1);
        let page = store
            .query_activity(&ActivityFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
    }
}
