//! Media domain models: ledger records and upload response shapes.
//!
//! `MediaEntry` field names are a wire format: external tooling (CSV export,
//! manual recovery) depends on them. Do not rename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A durable record of one uploaded media object.
///
/// Created exactly once when a successful store-write completes; never
/// mutated afterwards; removed only by explicit id or storage-key match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MediaEntry {
    pub id: String,
    /// Product the image is attached to, if any. Set after upload (or never);
    /// the ledger does not validate that the product exists.
    pub product_id: Option<String>,
    pub url: String,
    pub s3_key: String,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size: i64,
    pub is_webp: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// Input for a ledger append: everything except the generated id and
/// timestamp, which the ledger stamps at write time.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewMediaEntry {
    #[serde(default)]
    pub product_id: Option<String>,
    pub url: String,
    pub s3_key: String,
    #[serde(default = "default_original_filename")]
    pub original_filename: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub is_webp: bool,
}

fn default_original_filename() -> String {
    "unknown".to_string()
}

fn default_mime_type() -> String {
    "application/octet-stream".to_string()
}

/// The full ledger document as persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaLedgerDocument {
    pub version: String,
    pub updated_at: DateTime<Utc>,
    pub entries: Vec<MediaEntry>,
}

impl MediaLedgerDocument {
    pub fn empty() -> Self {
        MediaLedgerDocument {
            version: crate::constants::LEDGER_VERSION.to_string(),
            updated_at: Utc::now(),
            entries: Vec::new(),
        }
    }
}

/// Per-file success record in an upload batch response.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    pub key: String,
    /// Final filename, extension switched to `.webp` when converted.
    pub name: String,
    pub original_size: u64,
    pub processed_size: u64,
    pub mime_type: String,
    #[serde(rename = "isWebP")]
    pub is_webp: bool,
    /// Percentage reduction; only meaningful when the file was converted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Per-file failure record. Partial batch success is an expected outcome:
/// one file failing must not hide its siblings' results.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadFileFailure {
    pub name: String,
    pub error: String,
}

/// Outcome for one file of an upload batch, in input order.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UploadFileResult {
    Uploaded(UploadedFile),
    Failed(UploadFileFailure),
}

impl UploadFileResult {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadFileResult::Uploaded(_))
    }
}

/// Response body for a batch upload. Order matches the request's file order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub files: Vec<UploadFileResult>,
}
