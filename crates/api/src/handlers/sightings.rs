//! Handlers for the `/sightings` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uas_core::error::CoreError;
use uas_core::sighting::ENTITY;
use uas_core::types::DbId;
use uas_db::models::sighting::{CreateSighting, Sighting, UpdateSighting};
use uas_db::repositories::SightingRepo;

use crate::error::{AppError, AppResult};
use crate::query::{ApiQuery, ListParams};
use crate::state::AppState;

/// GET /sightings
///
/// List sightings in id order. Supports `?skip=&limit=`.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<Json<Vec<Sighting>>> {
    let sightings = SightingRepo::list(&state.pool, params.offset(), params.limit()).await?;
    Ok(Json(sightings))
}

/// POST /sightings
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSighting>,
) -> AppResult<(StatusCode, Json<Sighting>)> {
    input.validate()?;
    let sighting = SightingRepo::create(&state.pool, &input).await?;
    tracing::info!(
        sighting_id = sighting.id,
        latitude = sighting.latitude,
        longitude = sighting.longitude,
        "Sighting reported",
    );
    Ok((StatusCode::CREATED, Json(sighting)))
}

/// GET /sightings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Sighting>> {
    let sighting = SightingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;
    Ok(Json(sighting))
}

/// PUT /sightings/{id}
///
/// Partial update: omitted fields keep their stored values.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSighting>,
) -> AppResult<Json<Sighting>> {
    input.validate()?;
    let sighting = SightingRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;
    tracing::info!(sighting_id = id, "Sighting updated");
    Ok(Json(sighting))
}
