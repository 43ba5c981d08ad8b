use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::cli::{ActivityCommands, Cli, Commands};
use folio::store::{MemStore, PgStore, Store};
use folio::{api, config, jobs, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "folio=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(Commands::Activity {
            command: ActivityCommands::Purge { older_than_days },
        }) => {
            let database_url = cfg
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for activity purge")?;
            let db = PgStore::connect(database_url).await?;
            let cutoff = Utc::now() - chrono::Duration::days(older_than_days);
            let deleted = db.purge_expired_activity(cutoff).await?;
            println!("deleted {deleted} activity records older than {older_than_days} days");
            Ok(())
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    let store: Arc<dyn Store> = match cfg.database_url.as_deref() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let db = PgStore::connect(url).await?;

            tracing::info!("Running migrations...");
            db.migrate().await?;

            Arc::new(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set — using in-memory store (data is not persisted)");
            Arc::new(MemStore::new())
        }
    };

    jobs::retention::spawn(store.clone(), cfg.activity_retention);

    let state = Arc::new(AppState::new(store, cfg));
    let app = api::router(state).layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listen address")?;
    axum::serve(listener, app).await?;

    Ok(())
}
