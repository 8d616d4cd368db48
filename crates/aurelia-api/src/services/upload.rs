//! Upload orchestrator: transcode → store → record, per file.
//!
//! A batch of files fans out with bounded concurrency; results come back in
//! input order (the UI correlates them with preview thumbnails by index).
//! Each file succeeds or fails on its own: conversion failure falls back to
//! uploading the original bytes, a storage failure fails only that file, and
//! a ledger failure is logged and swallowed because the stored blob, not the
//! ledger, is the source of truth for existence.

use std::sync::Arc;

use futures::StreamExt;

use aurelia_core::models::{
    NewMediaEntry, UploadFileFailure, UploadFileResult, UploadResponse, UploadedFile,
};
use aurelia_ledger::MediaLedger;
use aurelia_processing::validator::sanitize_filename;
use aurelia_processing::{ConversionOutcome, ImageTranscoder, ProcessingOptions};
use aurelia_storage::{generate_upload_key, Storage};

/// One file of an upload batch, as received from the request.
#[derive(Debug, Clone)]
pub struct UploadedPart {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Drives the per-file pipeline for upload batches.
pub struct MediaUploadService {
    storage: Arc<dyn Storage>,
    ledger: Arc<MediaLedger>,
    options: ProcessingOptions,
    concurrency: usize,
}

impl MediaUploadService {
    pub fn new(
        storage: Arc<dyn Storage>,
        ledger: Arc<MediaLedger>,
        options: ProcessingOptions,
        concurrency: usize,
    ) -> Self {
        MediaUploadService {
            storage,
            ledger,
            options,
            concurrency: concurrency.max(1),
        }
    }

    /// Process a batch of files. Output order matches input order.
    pub async fn handle_batch(&self, files: Vec<UploadedPart>) -> UploadResponse {
        let results = futures::stream::iter(files.into_iter().map(|file| self.process_one(file)))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        UploadResponse { files: results }
    }

    /// Run one file through transcode → store → record.
    #[tracing::instrument(skip(self, file), fields(filename = %file.filename, content_type = %file.content_type))]
    async fn process_one(&self, file: UploadedPart) -> UploadFileResult {
        let UploadedPart {
            data,
            filename,
            content_type,
        } = file;
        let original_size = data.len();

        // Decode and encode are CPU-bound; run off the async pool. The
        // original bytes come back out for the fallback path.
        let options = self.options;
        let mime = content_type.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let outcome = ImageTranscoder::convert_for_upload(&data, &mime, &options);
            (data, outcome)
        })
        .await;

        let (data, outcome) = match joined {
            Ok(pair) => pair,
            Err(err) => {
                tracing::error!(error = %err, filename = %filename, "Transcode task panicked");
                return UploadFileResult::Failed(UploadFileFailure {
                    name: filename,
                    error: "image processing failed".to_string(),
                });
            }
        };

        let (payload, final_name, final_mime, is_webp, compression_ratio, width, height) =
            match outcome {
                ConversionOutcome::Converted(processed) => {
                    let stem = filename
                        .rsplit_once('.')
                        .map(|(stem, _)| stem)
                        .unwrap_or(filename.as_str());
                    let renamed = format!("{}.webp", stem);
                    tracing::info!(
                        original = %filename,
                        renamed = %renamed,
                        compression_pct = processed.compression_ratio,
                        "Converted upload to WebP"
                    );
                    (
                        processed.buffer.to_vec(),
                        renamed,
                        processed.mime_type,
                        true,
                        Some(processed.compression_ratio),
                        Some(processed.width),
                        Some(processed.height),
                    )
                }
                ConversionOutcome::Unconverted { reason } => {
                    tracing::debug!(
                        filename = %filename,
                        reason = %reason,
                        "Uploading original bytes without conversion"
                    );
                    (data, filename.clone(), content_type.clone(), false, None, None, None)
                }
            };

        let safe_name = sanitize_filename(&final_name);
        let key = generate_upload_key(&safe_name);
        let stored_size = payload.len();

        let url = match self.storage.put(&key, payload, &final_mime).await {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(error = %err, key = %key, filename = %filename, "Storage write failed");
                return UploadFileResult::Failed(UploadFileFailure {
                    name: filename,
                    error: format!("storage write failed: {}", err),
                });
            }
        };

        // The blob is stored and usable at this point; a ledger failure must
        // not fail the upload.
        let record = NewMediaEntry {
            product_id: None,
            url: url.clone(),
            s3_key: key.clone(),
            original_filename: filename,
            mime_type: final_mime.clone(),
            file_size: stored_size as i64,
            is_webp,
        };
        if let Err(err) = self.ledger.append(vec![record]).await {
            tracing::error!(error = %err, key = %key, "Failed to record upload in media ledger");
        }

        UploadFileResult::Uploaded(UploadedFile {
            url,
            key,
            name: safe_name,
            original_size: original_size as u64,
            processed_size: stored_size as u64,
            mime_type: final_mime,
            is_webp,
            compression_ratio,
            width,
            height,
        })
    }
}
