//! Shared query parameter types for API handlers.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::AppError;

/// Query-string extractor whose rejection is an [`AppError`].
///
/// A value of the wrong type (e.g. `latitude=abc`) yields the usual
/// `{"error","code"}` body with code `BAD_REQUEST`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// Page size used when `limit` is omitted.
pub const DEFAULT_LIMIT: i64 = 100;

/// Upper bound on `limit`.
pub const MAX_LIMIT: i64 = 500;

/// Offset pagination parameters (`?skip=&limit=`). `offset` is accepted as an
/// alias for `skip`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(alias = "offset")]
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListParams {
    /// Offset clamped to be non-negative.
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    /// Limit defaulted and clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}
