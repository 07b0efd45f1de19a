use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use courtdir::{
    build_router,
    config::{Config, StoreBackend},
    db::Database,
    schema,
    store::{CourtStore, MemoryStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    schema::ensure_checked()?;

    let store: Arc<dyn CourtStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let db = Database::new_with_pool_config(
                &config.database_url,
                config.db_max_connections,
                1,
            )
            .await?;
            info!("Running SQLx migrations...");
            db.migrate().await?;
            Arc::new(db)
        }
        StoreBackend::Memory => {
            info!("Using the in-memory court store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let state = Arc::new(AppState::new(store, config.clone())?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    info!("Server starting on {}", config.server_address);

    axum::serve(listener, app).await?;

    Ok(())
}
