//! HTTP rendering for application errors.
//!
//! Handlers return `Result<_, HttpAppError>`; every domain error converts
//! into it and renders as the JSON [`ErrorResponse`] shape, with a status
//! and log line driven by the error's own metadata. Details and error
//! chains are shown only in non-production environments and only for
//! non-sensitive errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use aurelia_core::{AppError, ErrorMetadata, LogLevel};
use aurelia_ledger::LedgerError;
use aurelia_pricing::QuoteError;
use aurelia_processing::ValidationError;
use aurelia_storage::StorageError;
use serde::Serialize;
use utoipa::ToSchema;

/// Wire shape of every error body this API produces.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable code, e.g. `STORAGE_ERROR`.
    pub code: String,
    /// Whether a retry could plausibly succeed.
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn render(err: &AppError, include_details: bool) -> Self {
        ErrorResponse {
            error: err.client_message(),
            details: include_details.then(|| err.detailed_message()),
            error_type: include_details.then(|| err.error_type().to_string()),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action().map(String::from),
        }
    }
}

/// Newtype so `IntoResponse` can be implemented for the core error type
/// (orphan rules keep the impl out of aurelia-core itself).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn in_production() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| matches!(env.to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = &self.0;

        match err.log_level() {
            LogLevel::Debug => {
                tracing::debug!(error = %err, error_type = err.error_type(), "Request failed")
            }
            LogLevel::Warn => {
                tracing::warn!(error = %err, error_type = err.error_type(), "Request failed")
            }
            LogLevel::Error => {
                tracing::error!(error = %err, error_type = err.error_type(), "Request failed")
            }
        }

        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let include_details = !in_production() && !err.is_sensitive();

        (status, Json(ErrorResponse::render(err, include_details))).into_response()
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(key) => AppError::NotFound(key),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::BackendError(msg) => AppError::Storage(msg),
        };
        HttpAppError(app)
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match &err {
            // Size violations get their own status; everything else is 400.
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            _ => AppError::InvalidInput(err.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<LedgerError> for HttpAppError {
    fn from(err: LedgerError) -> Self {
        HttpAppError(AppError::Ledger(err.to_string()))
    }
}

impl From<QuoteError> for HttpAppError {
    fn from(err: QuoteError) -> Self {
        HttpAppError(AppError::InvalidInput(err.to_string()))
    }
}
