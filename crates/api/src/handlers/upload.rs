//! Handler for sighting image uploads.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use uas_core::upload::{UploadError, ValidatedImage};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field name carrying image files.
const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub image_urls: Vec<String>,
}

/// POST /upload_images
///
/// Accepts one or more `files` fields. Every file is validated before any is
/// written, so a rejected file leaves nothing behind. Returns the public URLs
/// in upload order.
pub async fn upload_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let upload = &state.config.upload;
    let mut accepted: Vec<(ValidatedImage, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let image = upload.validate(&filename, &data)?;
        accepted.push((image, data.to_vec()));
    }

    if accepted.is_empty() {
        return Err(UploadError::NoFiles.into());
    }

    tokio::fs::create_dir_all(&upload.upload_dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let mut image_urls = Vec::with_capacity(accepted.len());
    for (image, data) in accepted {
        tokio::fs::write(upload.path_for(&image.file_name), &data)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        tracing::info!(
            file = %image.file_name,
            width = image.width,
            height = image.height,
            bytes = data.len(),
            "Stored sighting image",
        );
        image_urls.push(upload.url_for(&image.file_name));
    }

    Ok(Json(UploadResponse { image_urls }))
}
