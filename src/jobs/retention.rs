//! Background job: purge activity records past the retention window.
//!
//! The source of truth for expiry is the sweep itself — Postgres has no
//! native TTL, so an hourly DELETE enforces the ceiling. Notifications are
//! never expired automatically.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use crate::store::Store;

const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Spawn the retention sweep. Call this once at startup.
pub fn spawn(store: Arc<dyn Store>, retention: Duration) {
    tokio::spawn(async move {
        let mut interval = time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = sweep(store.as_ref(), retention).await {
                tracing::error!("activity retention sweep failed: {}", e);
            }
        }
    });
}

/// One pass: delete everything created before `now - retention`.
pub async fn sweep(store: &dyn Store, retention: Duration) -> anyhow::Result<()> {
    let cutoff = Utc::now()
        - chrono::Duration::from_std(retention).unwrap_or_else(|_| chrono::Duration::days(7));
    let deleted = store.purge_expired_activity(cutoff).await?;
    if deleted > 0 {
        tracing::info!(rows = deleted, "purged expired activity records");
    }
    Ok(())
}
