pub mod health;
pub mod sightings;
pub mod upload;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the API route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sightings                                       list, create
/// /sightings/{id}                                  get, update
///
/// /sightings/search                                combined time/proximity/unit search
/// /sightings/search/time                           time window search
/// /sightings/search/proximity                      radius search
/// /sightings/search/mgrs                           MGRS center + radius search
///
/// /upload_images                                   multipart image upload (POST)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .merge(sightings::router())
        .merge(upload::router(&config.upload))
}
