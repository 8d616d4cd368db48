//! Media ledger endpoints: list/export, ingest, remove.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use aurelia_core::models::{MediaEntry, NewMediaEntry};
use aurelia_core::AppError;
use aurelia_ledger::{export_csv, RemoveSelector};

use crate::error::HttpAppError;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    pub product_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// `csv` switches the response to a CSV attachment.
    pub format: Option<String>,
}

/// List ledger entries, optionally filtered by product, as JSON or CSV.
#[utoipa::path(
    get,
    path = "/admin/media-backup",
    tag = "media-backup",
    params(ListQuery),
    responses(
        (status = 200, description = "Ledger entries", body = [MediaEntry])
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_ledger"))]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Response, HttpAppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let product_id = query.product_id.as_deref();

    if query.format.as_deref() == Some("csv") {
        // CSV export covers the whole filtered set, not one page.
        let (entries, _) = state
            .ledger
            .list(product_id, usize::MAX, 0)
            .await
            .map_err(HttpAppError::from)?;
        let csv = export_csv(&entries);

        let filename = format!(
            "media-backup-{}.csv",
            chrono::Utc::now().timestamp_millis()
        );
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            csv,
        )
            .into_response());
    }

    let document = state.ledger.load().await.map_err(HttpAppError::from)?;
    let (entries, total) = state
        .ledger
        .list(product_id, limit, offset)
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(json!({
        "version": document.version,
        "updated_at": document.updated_at,
        "total": total,
        "limit": limit,
        "offset": offset,
        "entries": entries,
    }))
    .into_response())
}

/// A ledger ingest row; rows missing `url` or `s3_key` are skipped.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IngestEntry {
    #[serde(default)]
    pub product_id: Option<String>,
    pub url: Option<String>,
    pub s3_key: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub is_webp: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum IngestBody {
    One(IngestEntry),
    Many(Vec<IngestEntry>),
}

/// Append entries to the ledger (used when uploads happen out of band).
#[utoipa::path(
    post,
    path = "/admin/media-backup",
    tag = "media-backup",
    request_body = IngestBody,
    responses(
        (status = 201, description = "Entries appended")
    )
)]
#[tracing::instrument(skip(state, body), fields(operation = "ingest_ledger"))]
pub async fn add_entries(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), HttpAppError> {
    let rows = match body {
        IngestBody::One(entry) => vec![entry],
        IngestBody::Many(entries) => entries,
    };

    let entries: Vec<NewMediaEntry> = rows
        .into_iter()
        .filter_map(|row| {
            let (url, s3_key) = match (row.url, row.s3_key) {
                (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => (url, key),
                _ => return None,
            };
            Some(NewMediaEntry {
                product_id: row.product_id,
                url,
                s3_key,
                original_filename: row
                    .original_filename
                    .unwrap_or_else(|| "unknown".to_string()),
                mime_type: row
                    .mime_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                file_size: row.file_size.unwrap_or(0),
                is_webp: row.is_webp.unwrap_or(false),
            })
        })
        .collect();

    let added = state
        .ledger
        .append(entries)
        .await
        .map_err(HttpAppError::from)?;
    let (_, total) = state
        .ledger
        .list(None, 0, 0)
        .await
        .map_err(HttpAppError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Entries appended to ledger",
            "added": added.len(),
            "total": total,
        })),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RemoveQuery {
    pub id: Option<String>,
    pub s3_key: Option<String>,
}

/// Remove ledger entries by id or storage key (exactly one selector).
#[utoipa::path(
    delete,
    path = "/admin/media-backup",
    tag = "media-backup",
    params(RemoveQuery),
    responses(
        (status = 200, description = "Entries removed"),
        (status = 400, description = "Missing or ambiguous selector", body = crate::error::ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "remove_ledger"))]
pub async fn remove_entries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    let selector = match (query.id, query.s3_key) {
        (Some(id), None) => RemoveSelector::ById(id),
        (None, Some(key)) => RemoveSelector::ByKey(key),
        _ => {
            return Err(AppError::InvalidInput(
                "Specify exactly one of `id` or `s3_key`".to_string(),
            )
            .into())
        }
    };

    let outcome = state
        .ledger
        .remove(selector)
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(json!({
        "message": "Entries removed",
        "deleted": outcome.removed,
        "remaining": outcome.remaining,
    })))
}
