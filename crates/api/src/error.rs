use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uas_core::error::CoreError;
use uas_core::search::SearchError;
use uas_core::upload::UploadError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain error enums and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `uas_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A rejected search query.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// A rejected image upload.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => internal(msg),
            },

            // --- Search validation ---
            AppError::Search(err) => {
                let (status, code) = match err {
                    SearchError::InvalidTimeFormat { .. } => {
                        (StatusCode::BAD_REQUEST, "INVALID_TIME_FORMAT")
                    }
                    SearchError::IncompleteTimeRange => {
                        (StatusCode::BAD_REQUEST, "INCOMPLETE_TIME_RANGE")
                    }
                    SearchError::InvalidRange => (StatusCode::BAD_REQUEST, "INVALID_RANGE"),
                    SearchError::IncompleteSpatialFilter(_) => {
                        (StatusCode::BAD_REQUEST, "INCOMPLETE_SPATIAL_FILTER")
                    }
                    SearchError::InvalidCoordinate(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_COORDINATE")
                    }
                };
                (status, code, err.to_string())
            }

            // --- Upload validation ---
            AppError::Upload(err) => {
                let code = match err {
                    UploadError::NoFiles => "NO_FILES",
                    UploadError::UnsupportedType(_) => "UNSUPPORTED_FILE_TYPE",
                    UploadError::TooLarge { .. } => "FILE_TOO_LARGE",
                    UploadError::InvalidImage => "INVALID_IMAGE",
                    UploadError::DimensionsTooLarge { .. } => "IMAGE_TOO_LARGE",
                };
                (StatusCode::BAD_REQUEST, code, err.to_string())
            }

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal(detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
