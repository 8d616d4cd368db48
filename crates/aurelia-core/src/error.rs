//! Application error taxonomy.
//!
//! Every fallible surface in the backend funnels into [`AppError`]. The
//! [`ErrorMetadata`] trait describes how an error presents at the HTTP
//! boundary (status, machine code, whether retrying makes sense) without
//! this crate depending on any web framework.

use std::io;

/// Severity at which an error should be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected rejections, e.g. validation failures.
    Debug,
    /// Degraded but recoverable situations.
    Warn,
    /// Unexpected failures.
    Error,
}

/// Presentation metadata for an error.
///
/// Implementors self-describe their HTTP response characteristics so the API
/// layer can render any error uniformly.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Machine-readable code, e.g. `STORAGE_ERROR`.
    fn error_code(&self) -> &'static str;

    /// Whether a retry could plausibly succeed.
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show to clients. May differ from the internal one.
    fn client_message(&self) -> String;

    /// Sensitive errors never expose details outside of development.
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Per-variant presentation constants. `client_message` stays dynamic and
/// lives in the trait impl.
struct Meta {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const RETRY: Option<&str> = Some("Retry after a short delay");

impl AppError {
    fn meta(&self) -> Meta {
        use AppError::*;
        match self {
            Storage(_) => Meta {
                status: 500,
                code: "STORAGE_ERROR",
                recoverable: true,
                action: RETRY,
                sensitive: true,
                level: LogLevel::Error,
            },
            ImageProcessing(_) => Meta {
                status: 400,
                code: "IMAGE_PROCESSING_ERROR",
                recoverable: false,
                action: Some("Check image format and try a different file"),
                sensitive: false,
                level: LogLevel::Warn,
            },
            Ledger(_) => Meta {
                status: 500,
                code: "LEDGER_ERROR",
                recoverable: true,
                action: RETRY,
                sensitive: true,
                level: LogLevel::Error,
            },
            InvalidInput(_) => Meta {
                status: 400,
                code: "INVALID_INPUT",
                recoverable: false,
                action: Some("Check request parameters and try again"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            BadRequest(_) => Meta {
                status: 400,
                code: "BAD_REQUEST",
                recoverable: false,
                action: Some("Check request format and parameters"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            NotFound(_) => Meta {
                status: 404,
                code: "NOT_FOUND",
                recoverable: false,
                action: Some("Verify the resource ID exists"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            PayloadTooLarge(_) => Meta {
                status: 413,
                code: "PAYLOAD_TOO_LARGE",
                recoverable: false,
                action: Some("Reduce file size"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            Internal(_) | InternalWithSource { .. } => Meta {
                status: 500,
                code: "INTERNAL_ERROR",
                recoverable: true,
                action: RETRY,
                sensitive: true,
                level: LogLevel::Error,
            },
        }
    }

    /// Variant name, for diagnostic payloads.
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Storage(_) => "Storage",
            AppError::ImageProcessing(_) => "ImageProcessing",
            AppError::Ledger(_) => "Ledger",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// The error message plus its source chain, capped at five levels.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut source = self.source();
        let mut depth = 0;

        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.meta().status
    }

    fn error_code(&self) -> &'static str {
        self.meta().code
    }

    fn is_recoverable(&self) -> bool {
        self.meta().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.meta().action
    }

    fn is_sensitive(&self) -> bool {
        self.meta().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.meta().level
    }

    fn client_message(&self) -> String {
        match self {
            // Internals of the storage and ledger layers stay private.
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Ledger(_) => "Failed to access media ledger".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            AppError::ImageProcessing(msg)
            | AppError::InvalidInput(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_storage() {
        let err = AppError::Storage("bucket unreachable".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access storage");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Resource not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Resource not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = AppError::PayloadTooLarge("11534336 bytes exceeds max".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert_eq!(err.suggested_action(), Some("Reduce file size"));
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let root = anyhow::anyhow!("disk full").context("write failed");
        let err = AppError::from(root);
        let details = err.detailed_message();
        assert!(details.contains("Caused by"));
        assert!(details.contains("disk full"));
    }
}
