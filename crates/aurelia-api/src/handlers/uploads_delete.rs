//! Blob deletion endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use aurelia_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteFileRequest {
    pub file_key: String,
}

/// Delete an object from the blob store by its storage key.
///
/// Ledger entries for the key are removed separately via the media-backup
/// endpoint; the ledger deliberately outlives the blob as a recovery aid.
#[utoipa::path(
    post,
    path = "/admin/uploads/delete",
    tag = "uploads",
    request_body = DeleteFileRequest,
    responses(
        (status = 200, description = "File deleted"),
        (status = 400, description = "Missing file_key", body = crate::error::ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_file"))]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteFileRequest>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    if request.file_key.trim().is_empty() {
        return Err(AppError::InvalidInput("`file_key` is required".to_string()).into());
    }

    state.storage.delete(&request.file_key).await?;

    tracing::info!(file_key = %request.file_key, "File deleted from storage");

    Ok(Json(json!({
        "id": request.file_key,
        "object": "file",
        "deleted": true,
    })))
}
