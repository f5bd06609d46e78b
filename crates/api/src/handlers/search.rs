//! Handlers for the `/sightings/search` endpoints.
//!
//! Every endpoint takes the same [`SearchParams`]; they differ only in which
//! groups are required. Results are JSON arrays of sightings, nearest first
//! whenever a spatial filter is active.

use axum::extract::State;
use axum::Json;
use uas_core::search::{search, SearchParams, SightingQuery};
use uas_db::models::sighting::Sighting;
use uas_db::store::PgSightingStore;

use crate::error::AppResult;
use crate::query::ApiQuery;
use crate::state::AppState;

/// GET /sightings/search/time?start_time=&end_time=
pub async fn by_time(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<Json<Vec<Sighting>>> {
    let query = SightingQuery::time_window(&params)?;
    execute(&state, &query, "time").await
}

/// GET /sightings/search/proximity?latitude=&longitude=&radius_km=
pub async fn by_proximity(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<Json<Vec<Sighting>>> {
    let query = SightingQuery::proximity(&params)?;
    execute(&state, &query, "proximity").await
}

/// GET /sightings/search?start_time=&end_time=&latitude=&longitude=&radius_km=&unit=
pub async fn combined(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<Json<Vec<Sighting>>> {
    let query = SightingQuery::combined(&params)?;
    execute(&state, &query, "combined").await
}

/// GET /sightings/search/mgrs?mgrs=&radius_km=&start_time=&end_time=&unit=
pub async fn by_mgrs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<Json<Vec<Sighting>>> {
    let query = SightingQuery::mgrs(&params, state.converter.as_ref())?;
    execute(&state, &query, "mgrs").await
}

async fn execute(
    state: &AppState,
    query: &SightingQuery,
    kind: &'static str,
) -> AppResult<Json<Vec<Sighting>>> {
    let store = PgSightingStore::new(state.pool.clone());
    let results = search(&store, query).await?;
    tracing::debug!(
        kind,
        time = query.time.is_some(),
        unit = ?query.unit,
        center = ?query.spatial.map(|s| s.center),
        radius_km = ?query.spatial.map(|s| s.radius_km),
        results = results.len(),
        "Sighting search",
    );
    Ok(Json(results))
}
