use std::time::Duration;

/// Activity records expire this long after creation (7 days).
pub const DEFAULT_ACTIVITY_RETENTION_SECS: u64 = 604_800;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Unset means "run on the in-memory store" (local dev, demos).
    pub database_url: Option<String>,
    /// Retention ceiling for activity records.
    pub activity_retention: Duration,
    /// Cadence of the live-update channel.
    pub realtime_tick: Duration,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    Ok(Config {
        port: std::env::var("FOLIO_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL").ok(),
        activity_retention: Duration::from_secs(
            std::env::var("FOLIO_ACTIVITY_RETENTION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ACTIVITY_RETENTION_SECS),
        ),
        realtime_tick: Duration::from_secs(
            std::env::var("FOLIO_REALTIME_TICK_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        ),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            activity_retention: Duration::from_secs(DEFAULT_ACTIVITY_RETENTION_SECS),
            realtime_tick: Duration::from_secs(5),
        }
    }
}
