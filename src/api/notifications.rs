use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::notification::{Category, Importance, Kind, NewNotification};
use crate::store::PageRequest;
use crate::AppState;

#[derive(Deserialize)]
pub struct CreateNotificationRequest {
    pub message: String,
    pub category: Category,
    #[serde(default, alias = "type")]
    pub kind: Kind,
    pub link: Option<String>,
    #[serde(default)]
    pub importance: Importance,
    pub metadata: Option<Value>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<Category>,
    #[serde(alias = "type")]
    pub kind: Option<Kind>,
    pub read: Option<bool>,
    pub importance: Option<Importance>,
}

/// POST /api/notifications
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut new = NewNotification::new(req.message, req.category)
        .kind(req.kind)
        .importance(req.importance);
    if let Some(link) = req.link {
        new = new.link(link);
    }
    if let Some(metadata) = req.metadata {
        new = new.metadata(metadata);
    }

    let notification = state.store.create_notification(new).await?;
    tracing::debug!(id = %notification.id, category = notification.category.as_str(), "notification created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "notification": notification })),
    ))
}

/// GET /api/notifications — filtered, paginated, newest first
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let filter = crate::models::notification::NotificationFilter {
        category: params.category,
        kind: params.kind,
        read: params.read,
        importance: params.importance,
    };
    let page = PageRequest::new(params.page, params.limit);

    let result = state.store.list_notifications(&filter, page).await?;

    Ok(Json(json!({
        "success": true,
        "data": result.items,
        "pagination": result.pagination,
    })))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let count = state.store.count_unread_notifications().await?;
    Ok(Json(json!({ "success": true, "count": count })))
}

/// PUT /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let notification = state.store.mark_notification_read(id).await?;
    Ok(Json(json!({ "success": true, "notification": notification })))
}

/// PUT /api/notifications/mark-all-read
pub async fn mark_all_read(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let modified = state.store.mark_all_notifications_read().await?;
    Ok(Json(json!({ "success": true, "modified_count": modified })))
}

/// DELETE /api/notifications/:id
pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.store.delete_notification(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/notifications/clear-all
pub async fn clear_all(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let deleted = state.store.clear_notifications().await?;
    tracing::info!(deleted, "cleared all notifications");
    Ok(Json(json!({ "success": true, "deleted_count": deleted })))
}
