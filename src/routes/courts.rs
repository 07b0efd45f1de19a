use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
    routing::get,
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    errors::CourtError,
    models::{Court, CourtId, CourtIdResponse, CreateCourt, ListCourtsQuery, Page, UpdateCourt},
    schema::{ArgsKind, COURTS_TABLE, SCHEMA},
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_courts).post(create_court))
        .route("/{id}", get(get_court).patch(update_court).delete(remove_court))
}

/// Checks a JSON body against the declared argument set before deserializing it,
/// so that out-of-set literals are reported with the allowed values.
fn parse_args<T: DeserializeOwned>(
    kind: ArgsKind,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, CourtError> {
    let Json(value) = body.map_err(|e| CourtError::validation(e.body_text()))?;
    SCHEMA.validate_args(COURTS_TABLE, kind, &value)?;
    serde_json::from_value(value).map_err(|e| CourtError::validation(e.to_string()))
}

fn court_id(path: Result<Path<Uuid>, PathRejection>) -> Result<CourtId, CourtError> {
    let Path(id) = path.map_err(|e| CourtError::validation(e.body_text()))?;
    Ok(CourtId(id))
}

#[utoipa::path(
    post,
    path = "/api/courts",
    tag = "courts",
    request_body = CreateCourt,
    responses(
        (status = 200, description = "Court created", body = CourtIdResponse),
        (status = 400, description = "Arguments rejected by the schema"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn create_court(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CourtIdResponse>, CourtError> {
    let court: CreateCourt = parse_args(ArgsKind::Create, body)?;
    let id = state.courts.create(court).await?;
    Ok(Json(CourtIdResponse { id }))
}

#[utoipa::path(
    get,
    path = "/api/courts",
    tag = "courts",
    params(ListCourtsQuery),
    responses(
        (status = 200, description = "One page of courts", body = Page<Court>),
        (status = 400, description = "Invalid filter, page size or cursor"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_courts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListCourtsQuery>, QueryRejection>,
) -> Result<Json<Page<Court>>, CourtError> {
    let Query(query) = query.map_err(|e| CourtError::validation(e.body_text()))?;
    let args = query.into_args(state.config.default_page_size);
    let page = state.courts.list(&args).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/courts/{id}",
    tag = "courts",
    params(
        ("id" = Uuid, Path, description = "Court ID")
    ),
    responses(
        (status = 200, description = "The court", body = Court),
        (status = 400, description = "Malformed court ID"),
        (status = 404, description = "Court not found")
    )
)]
pub async fn get_court(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Court>, CourtError> {
    let court = state.courts.get(court_id(id)?).await?;
    Ok(Json(court))
}

#[utoipa::path(
    patch,
    path = "/api/courts/{id}",
    tag = "courts",
    params(
        ("id" = Uuid, Path, description = "Court ID")
    ),
    request_body = UpdateCourt,
    responses(
        (status = 200, description = "Court updated", body = CourtIdResponse),
        (status = 400, description = "Arguments rejected by the schema"),
        (status = 404, description = "Court not found")
    )
)]
pub async fn update_court(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CourtIdResponse>, CourtError> {
    let id = court_id(id)?;
    let patch: UpdateCourt = parse_args(ArgsKind::Patch, body)?;
    let id = state.courts.update(id, patch).await?;
    Ok(Json(CourtIdResponse { id }))
}

#[utoipa::path(
    delete,
    path = "/api/courts/{id}",
    tag = "courts",
    params(
        ("id" = Uuid, Path, description = "Court ID")
    ),
    responses(
        (status = 200, description = "Court deleted", body = CourtIdResponse),
        (status = 400, description = "Malformed court ID"),
        (status = 404, description = "Court not found")
    )
)]
pub async fn remove_court(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CourtIdResponse>, CourtError> {
    let id = state.courts.remove(court_id(id)?).await?;
    Ok(Json(CourtIdResponse { id }))
}
