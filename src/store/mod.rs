//! Storage layer. The `Store` trait is the one shared resource in the
//! process: handlers, the live-update channel, and the retention job all
//! hold an `Arc<dyn Store>` and nothing else. Bulk mutations are single
//! statements in every implementation, never read-then-write loops.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::{Activity, ActivityFilter, ActivityPurgeFilter, NewActivity};
use crate::models::notification::{NewNotification, Notification, NotificationFilter};

pub mod memory;
pub mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

/// Default and maximum page sizes for every listing endpoint.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A 1-based page request. Constructed through `new`, which clamps
/// out-of-range values instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Saturates rather than overflowing: the wire accepts any i64 page
    /// number, and a page past the end is just an empty result.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn compute(total: i64, req: PageRequest) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + req.limit - 1) / req.limit
        };
        Self {
            total,
            page: req.page,
            pages,
            has_more: req.page < pages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Persistence contract for notifications and the activity log.
#[async_trait]
pub trait Store: Send + Sync {
    // -- Notifications --

    async fn create_notification(&self, new: NewNotification) -> Result<Notification, AppError>;

    /// Filtered listing, newest first.
    async fn list_notifications(
        &self,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> Result<Page<Notification>, AppError>;

    /// Unread notifications, newest first, capped at `limit`. Serves the
    /// live-update channel's per-tick snapshot.
    async fn list_unread_notifications(&self, limit: i64) -> Result<Vec<Notification>, AppError>;

    async fn count_unread_notifications(&self) -> Result<u64, AppError>;

    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification, AppError>;

    /// Single bulk update; returns the number of rows flipped, so a second
    /// call reports zero.
    async fn mark_all_notifications_read(&self) -> Result<u64, AppError>;

    async fn delete_notification(&self, id: Uuid) -> Result<(), AppError>;

    async fn clear_notifications(&self) -> Result<u64, AppError>;

    // -- Activity log --

    async fn record_activity(&self, new: NewActivity) -> Result<Activity, AppError>;

    async fn query_activity(
        &self,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> Result<Page<Activity>, AppError>;

    async fn purge_activity(&self, filter: &ActivityPurgeFilter) -> Result<u64, AppError>;

    /// Retention sweep: delete activities created before `cutoff`. The
    /// caller computes the cutoff so tests can inject a clock.
    async fn purge_expired_activity(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let p = PageRequest::new(Some(0), Some(10_000));
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, MAX_PAGE_LIMIT);
        assert_eq!(p.offset(), 0);

        let p = PageRequest::new(Some(3), Some(25));
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn test_offset_saturates_for_huge_page_numbers() {
        let p = PageRequest::new(Some(i64::MAX), Some(100));
        assert_eq!(p.offset(), i64::MAX);
        assert!(p.offset() >= 0);
    }

    #[test]
    fn test_pagination_compute() {
        let req = PageRequest::new(Some(2), Some(10));
        let p = Pagination::compute(25, req);
        assert_eq!(p.pages, 3);
        assert!(p.has_more);

        let last = Pagination::compute(25, PageRequest::new(Some(3), Some(10)));
        assert!(!last.has_more);

        let empty = Pagination::compute(0, PageRequest::default());
        assert_eq!(empty.pages, 0);
        assert!(!empty.has_more);
    }
}
