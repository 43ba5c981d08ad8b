use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::activity::{
    ActivityAction, ActivityFilter, ActivityPurgeFilter, ActivityStatus, ActivityType, NewActivity,
};
use crate::models::notification::Importance;
use crate::store::PageRequest;
use crate::AppState;

#[derive(Deserialize)]
pub struct RecordActivityRequest {
    #[serde(rename = "type")]
    pub entity: ActivityType,
    pub action: ActivityAction,
    pub title: String,
    pub description: Option<String>,
    pub metadata: Option<Value>,
    pub actor: Option<String>,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub importance: Importance,
}

#[derive(Deserialize)]
pub struct ActivityQueryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub entity: Option<ActivityType>,
    pub action: Option<ActivityAction>,
    pub status: Option<ActivityStatus>,
    pub importance: Option<Importance>,
    #[serde(alias = "startDate")]
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(alias = "endDate")]
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// Best-effort client address: first hop of x-forwarded-for, else x-real-ip.
/// An absent header yields an empty string, never an error.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or_default()
        .to_string()
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// POST /api/admin/activity
pub async fn record(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RecordActivityRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut new = NewActivity::new(req.entity, req.action, req.title);
    new.description = req.description;
    new.actor = req.actor;
    new.status = req.status;
    new.importance = req.importance;
    new.ip = client_ip(&headers);
    new.user_agent = user_agent(&headers);
    if let Some(metadata) = req.metadata {
        new.metadata = metadata;
    }

    let activity = state.store.record_activity(new).await?;
    tracing::debug!(id = %activity.id, action = activity.action.as_str(), "activity recorded");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": activity })),
    ))
}

/// GET /api/admin/activity — filtered timeline, newest first
pub async fn query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivityQueryParams>,
) -> Result<Json<Value>, AppError> {
    let filter = ActivityFilter {
        entity: params.entity,
        action: params.action,
        status: params.status,
        importance: params.importance,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let page = PageRequest::new(params.page, params.limit);
    let result = state.store.query_activity(&filter, page).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "activities": result.items,
            "pagination": result.pagination,
        }
    })))
}

/// DELETE /api/admin/activity — bulk cleanup by filter
pub async fn purge(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ActivityPurgeFilter>,
) -> Result<Json<Value>, AppError> {
    let deleted = state.store.purge_activity(&filter).await?;
    tracing::info!(deleted, "purged activity records");
    Ok(Json(json!({ "success": true, "data": { "deleted": deleted } })))
}
