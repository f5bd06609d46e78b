use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use tower_http::services::ServeDir;
use uas_core::upload::UploadConfig;

use crate::handlers::upload;
use crate::state::AppState;

/// Files accepted in one upload request; bounds the request body size.
pub const MAX_FILES_PER_REQUEST: usize = 10;

/// Room for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Mount the upload endpoint and serve stored images.
///
/// ```text
/// POST  /upload_images
/// GET   {public_prefix}/{file}        (static files from the upload directory)
/// ```
pub fn router(config: &UploadConfig) -> Router<AppState> {
    let body_limit = config
        .max_bytes
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/upload_images",
            post(upload::upload_images).layer(DefaultBodyLimit::max(body_limit)),
        )
        .nest_service(&config.public_prefix, ServeDir::new(&config.upload_dir))
}
