use axum::Router;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{Cost, Court, CourtIdResponse, CourtStatus, CourtType, CreateCourt, UpdateCourt},
    AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health_check,
        crate::routes::courts::create_court,
        crate::routes::courts::list_courts,
        crate::routes::courts::get_court,
        crate::routes::courts::update_court,
        crate::routes::courts::remove_court,
    ),
    components(
        schemas(
            Court, CreateCourt, UpdateCourt, CourtIdResponse, CourtType, Cost, CourtStatus
        )
    ),
    tags(
        (name = "courts", description = "Court directory operations"),
        (name = "health", description = "Liveness check"),
    ),
    info(
        title = "Courtdir API",
        version = "0.1.0",
        description = "Directory of sports courts with filtered, searchable listings"
    )
)]
pub struct ApiDoc;

pub fn create_swagger_router() -> Router<Arc<AppState>> {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
