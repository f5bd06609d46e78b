use std::sync::Arc;

use uas_core::mgrs::CoordinateConverter;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: uas_db::DbPool,
    /// Server configuration, including upload limits.
    pub config: Arc<ServerConfig>,
    /// MGRS to latitude/longitude conversion used by the MGRS search.
    pub converter: Arc<dyn CoordinateConverter>,
}
