use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Page, PageRequest, Pagination, Store};
use crate::errors::AppError;
use crate::models::activity::{Activity, ActivityFilter, ActivityPurgeFilter, NewActivity};
use crate::models::notification::{NewNotification, Notification, NotificationFilter};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

// Enum columns are stored as text; rows decode to string-typed structs and
// convert, so a corrupt row surfaces as an internal error instead of a
// silent default.

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    message: String,
    kind: String,
    category: String,
    read: bool,
    link: Option<String>,
    importance: String,
    metadata: Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self, AppError> {
        Ok(Notification {
            id: row.id,
            message: row.message,
            kind: row.kind.parse().map_err(anyhow::Error::msg)?,
            category: row.category.parse().map_err(anyhow::Error::msg)?,
            read: row.read,
            link: row.link,
            importance: row.importance.parse().map_err(anyhow::Error::msg)?,
            metadata: row.metadata,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    r#type: String,
    action: String,
    title: String,
    description: Option<String>,
    metadata: Value,
    actor: Option<String>,
    ip: String,
    user_agent: String,
    status: String,
    importance: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = AppError;

    fn try_from(row: ActivityRow) -> Result<Self, AppError> {
        Ok(Activity {
            id: row.id,
            entity: row.r#type.parse().map_err(anyhow::Error::msg)?,
            action: row.action.parse().map_err(anyhow::Error::msg)?,
            title: row.title,
            description: row.description,
            metadata: row.metadata,
            actor: row.actor,
            ip: row.ip,
            user_agent: row.user_agent,
            status: row.status.parse().map_err(anyhow::Error::msg)?,
            importance: row.importance.parse().map_err(anyhow::Error::msg)?,
            created_at: row.created_at,
        })
    }
}

fn push_notification_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &NotificationFilter) {
    if let Some(category) = filter.category {
        qb.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND kind = ").push_bind(kind.as_str());
    }
    if let Some(read) = filter.read {
        qb.push(" AND read = ").push_bind(read);
    }
    if let Some(importance) = filter.importance {
        qb.push(" AND importance = ").push_bind(importance.as_str());
    }
}

fn push_activity_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ActivityFilter) {
    if let Some(entity) = filter.entity {
        qb.push(" AND type = ").push_bind(entity.as_str());
    }
    if let Some(action) = filter.action {
        qb.push(" AND action = ").push_bind(action.as_str());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(importance) = filter.importance {
        qb.push(" AND importance = ").push_bind(importance.as_str());
    }
    if let Some(start) = filter.start_date {
        qb.push(" AND created_at >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(" AND created_at <= ").push_bind(end);
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification, AppError> {
        let n = new.materialize()?;
        sqlx::query(
            r#"INSERT INTO notifications (id, message, kind, category, read, link, importance, metadata, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(n.id)
        .bind(&n.message)
        .bind(n.kind.as_str())
        .bind(n.category.as_str())
        .bind(n.read)
        .bind(&n.link)
        .bind(n.importance.as_str())
        .bind(&n.metadata)
        .bind(n.created_at)
        .execute(&self.pool)
        .await?;
        Ok(n)
    }

    async fn list_notifications(
        &self,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> Result<Page<Notification>, AppError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications WHERE TRUE");
        push_notification_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, message, kind, category, read, link, importance, metadata, created_at \
             FROM notifications WHERE TRUE",
        );
        push_notification_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<NotificationRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            pagination: Pagination::compute(total, page),
        })
    }

    async fn list_unread_notifications(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"SELECT id, message, kind, category, read, link, importance, metadata, created_at
               FROM notifications
               WHERE read = FALSE
               ORDER BY created_at DESC, id
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn count_unread_notifications(&self) -> Result<u64, AppError> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM notifications WHERE read = FALSE"#)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"UPDATE notifications SET read = TRUE WHERE id = $1
               RETURNING id, message, kind, category, read, link, importance, metadata, created_at"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("notification"))?;
        row.try_into()
    }

    async fn mark_all_notifications_read(&self) -> Result<u64, AppError> {
        let res = sqlx::query(r#"UPDATE notifications SET read = TRUE WHERE read = FALSE"#)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn delete_notification(&self, id: Uuid) -> Result<(), AppError> {
        let res = sqlx::query(r#"DELETE FROM notifications WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("notification"));
        }
        Ok(())
    }

    async fn clear_notifications(&self) -> Result<u64, AppError> {
        let res = sqlx::query(r#"DELETE FROM notifications"#)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn record_activity(&self, new: NewActivity) -> Result<Activity, AppError> {
        let a = new.materialize()?;
        sqlx::query(
            r#"INSERT INTO activities (id, type, action, title, description, metadata, actor, ip, user_agent, status, importance, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(a.id)
        .bind(a.entity.as_str())
        .bind(a.action.as_str())
        .bind(&a.title)
        .bind(&a.description)
        .bind(&a.metadata)
        .bind(&a.actor)
        .bind(&a.ip)
        .bind(&a.user_agent)
        .bind(a.status.as_str())
        .bind(a.importance.as_str())
        .bind(a.created_at)
        .execute(&self.pool)
        .await?;
        Ok(a)
    }

    async fn query_activity(
        &self,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> Result<Page<Activity>, AppError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM activities WHERE TRUE");
        push_activity_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, type, action, title, description, metadata, actor, ip, user_agent, status, importance, created_at \
             FROM activities WHERE TRUE",
        );
        push_activity_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<ActivityRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(Activity::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            pagination: Pagination::compute(total, page),
        })
    }

    async fn purge_activity(&self, filter: &ActivityPurgeFilter) -> Result<u64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM activities WHERE TRUE");
        if let Some(entity) = filter.entity {
            qb.push(" AND type = ").push_bind(entity.as_str());
        }
        if let Some(action) = filter.action {
            qb.push(" AND action = ").push_bind(action.as_str());
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(importance) = filter.importance {
            qb.push(" AND importance = ").push_bind(importance.as_str());
        }
        if let Some(older_than) = filter.older_than {
            qb.push(" AND created_at < ").push_bind(older_than);
        }
        let res = qb.build().execute(&self.pool).await?;
        Ok(res.rows_affected())
    }

    async fn purge_expired_activity(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let res = sqlx::query(r#"DELETE FROM activities WHERE created_at < $1"#)
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
