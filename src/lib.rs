pub mod config;
pub mod courts;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;
pub mod swagger;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


use axum::{routing::get, Json, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::Config;
use courts::CourtService;

#[derive(Clone)]
pub struct AppState {
    pub courts: CourtService,
    pub config: Config,
}

impl AppState {
    /// Fails if the schema declarations are inconsistent.
    pub fn new(
        store: Arc<dyn store::CourtStore>,
        config: Config,
    ) -> Result<Self, schema::SchemaError> {
        schema::ensure_checked()?;
        Ok(Self {
            courts: CourtService::new(store, config.max_page_size),
            config,
        })
    }
}

/// Health check endpoint for monitoring
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Assembles the HTTP surface over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/courts", routes::courts::router())
        .merge(swagger::create_swagger_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
