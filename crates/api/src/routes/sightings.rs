use axum::routing::get;
use axum::Router;

use crate::handlers::{search, sightings};
use crate::state::AppState;

/// Mount sighting CRUD and search routes.
///
/// ```text
/// GET, POST  /sightings
/// GET        /sightings/search
/// GET        /sightings/search/time
/// GET        /sightings/search/proximity
/// GET        /sightings/search/mgrs
/// GET, PUT   /sightings/{id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sightings", get(sightings::list).post(sightings::create))
        .route("/sightings/search", get(search::combined))
        .route("/sightings/search/time", get(search::by_time))
        .route("/sightings/search/proximity", get(search::by_proximity))
        .route("/sightings/search/mgrs", get(search::by_mgrs))
        .route(
            "/sightings/{id}",
            get(sightings::get_by_id).put(sightings::update),
        )
}
