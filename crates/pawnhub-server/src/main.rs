mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pawnhub_api::AppStateInner;
use pawnhub_db::{Catalog, Database, LocalCatalog};

use crate::config::{Config, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pawnhub=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.uses_dev_secret() {
        warn!("PAWNHUB_JWT_SECRET not set, using the development secret");
    }

    // Users always live in SQLite; the catalog backend is configurable
    let db = Arc::new(Database::open(&config.db_path)?);
    let catalog: Arc<dyn Catalog> = match config.storage {
        StorageBackend::Sqlite => db.clone(),
        StorageBackend::Local => Arc::new(LocalCatalog::open(&config.local_dir)?),
    };
    info!(storage = ?config.storage, merge_policy = ?config.merge_policy, "Catalog ready");

    let state = AppStateInner::new(catalog, db, config.merge_policy, config.jwt_secret.clone());

    let app = pawnhub_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr();
    info!("PawnHub server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
