//! Batch upload endpoint.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use aurelia_core::models::UploadResponse;
use aurelia_core::AppError;

use crate::error::HttpAppError;
use crate::services::upload::{MediaUploadService, UploadedPart};
use crate::state::AppState;
use crate::validation::validate_batch;

/// Upload a batch of files, converting eligible images to WebP.
///
/// Each file is processed independently: per-file failures appear in the
/// response alongside their siblings' successes. The batch itself only fails
/// wholesale on malformed input.
#[utoipa::path(
    post,
    path = "/admin/uploads",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch processed", body = UploadResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_batch"))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            // Non-file form fields are ignored.
            continue;
        };
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file field: {}", e)))?
            .to_vec();

        files.push(UploadedPart {
            data,
            filename,
            content_type,
        });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files found in request".to_string()).into());
    }

    validate_batch(&state.config, &files)?;

    tracing::info!(batch_size = files.len(), "Processing upload batch");

    let service = MediaUploadService::new(
        Arc::clone(&state.storage),
        Arc::clone(&state.ledger),
        state.processing_options(),
        state.config.upload_concurrency(),
    );

    Ok(Json(service.handle_batch(files).await))
}

/// Upload capability descriptor.
#[utoipa::path(
    get,
    path = "/admin/uploads",
    tag = "uploads",
    responses((status = 200, description = "Upload capabilities"))
)]
pub async fn upload_info(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "message": "Use POST to upload files",
            "supported_formats": state.config.allowed_extensions(),
            "auto_convert_to_webp": true,
            "max_file_size_bytes": state.config.max_file_size_bytes(),
            "max_batch_files": state.config.max_batch_files(),
        })),
    )
}
