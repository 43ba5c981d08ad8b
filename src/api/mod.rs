use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{delete, get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod activity;
pub mod notifications;
pub mod realtime;

/// Build the application router. Literal segments are registered before the
/// `:id` routes so `mark-all-read` and friends never parse as ids.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/notifications",
            get(notifications::list).post(notifications::create),
        )
        .route(
            "/api/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route(
            "/api/notifications/mark-all-read",
            put(notifications::mark_all_read),
        )
        .route(
            "/api/notifications/clear-all",
            delete(notifications::clear_all),
        )
        .route("/api/notifications/realtime", get(realtime::stream))
        .route("/api/notifications/:id/read", put(notifications::mark_read))
        .route("/api/notifications/:id", delete(notifications::delete_one))
        .route(
            "/api/admin/activity",
            get(activity::query)
                .post(activity::record)
                .delete(activity::purge),
        )
        .route("/healthz", get(|| async { "ok" }))
        .fallback(fallback_404)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
