//! Live-update channel: a long-lived SSE connection that pushes a full
//! snapshot of the current unread notifications on every tick. The polling
//! future is owned by the response body, so a client disconnect drops the
//! stream and no further store queries are issued for that channel. An
//! in-flight query at the moment of disconnect completes and its result is
//! discarded.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Utc;
use futures::stream::{Stream, StreamExt};
use serde_json::json;
use tokio_stream::wrappers::IntervalStream;

use crate::store::Store;
use crate::AppState;

/// Snapshots are full replacements, so there is no value in pushing more
/// than the bell UI can show.
pub const SNAPSHOT_LIMIT: i64 = 50;

/// One tick's payload: either the unread set or an error frame. A failed
/// query never terminates the channel; the next tick retries naturally.
pub async fn unread_snapshot(store: &dyn Store) -> serde_json::Value {
    match store.list_unread_notifications(SNAPSHOT_LIMIT).await {
        Ok(notifications) => json!({
            "notifications": notifications,
            "timestamp": Utc::now(),
        }),
        Err(e) => {
            // Detail stays in the log; the frame mirrors the HTTP error
            // envelope and never echoes store internals to the client.
            tracing::warn!("realtime snapshot query failed: {}", e);
            json!({ "error": "snapshot unavailable" })
        }
    }
}

/// Repeating snapshot stream. The first tick fires immediately (initial
/// push), then once per `tick` interval.
pub fn unread_snapshots(
    store: Arc<dyn Store>,
    tick: Duration,
) -> impl Stream<Item = Result<Event, Infallible>> {
    IntervalStream::new(tokio::time::interval(tick)).then(move |_| {
        let store = store.clone();
        async move {
            let snapshot = unread_snapshot(store.as_ref()).await;
            Ok::<_, Infallible>(
                Event::default()
                    .event("snapshot")
                    .data(snapshot.to_string()),
            )
        }
    })
}

/// GET /api/notifications/realtime
pub async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = unread_snapshots(state.store.clone(), state.config.realtime_tick);
    Sse::new(stream).keep_alive(KeepAlive::default())
}
