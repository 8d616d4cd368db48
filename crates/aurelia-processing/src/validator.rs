//! Upload admission rules.
//!
//! Everything here runs at the request-acceptance boundary, before any
//! decoding starts. The limits (size, allowed types) come from
//! configuration; the extension↔content-type table is fixed.

use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Missing file extension (filename: {0})")]
    MissingExtension(String),

    #[error("Empty file")]
    EmptyFile,

    #[error("Too many files: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },
}

/// Lowercased extension of a filename, or a MissingExtension error.
fn extension_of(filename: &str) -> Result<String, ValidationError> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| ValidationError::MissingExtension(filename.to_string()))
}

/// Content types a given extension may legitimately declare. `None` means
/// the extension is unknown here and cross-checking is skipped.
fn content_types_for(extension: &str) -> Option<&'static [&'static str]> {
    Some(match extension {
        "jpg" | "jpeg" => &["image/jpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        "avif" => &["image/avif"],
        "svg" => &["image/svg+xml"],
        "bmp" => &["image/bmp"],
        "ico" => &["image/x-icon", "image/vnd.microsoft.icon"],
        _ => return None,
    })
}

/// Validates uploaded files against configured limits.
pub struct MediaValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        match size {
            0 => Err(ValidationError::EmptyFile),
            s if s > self.max_file_size => Err(ValidationError::FileTooLarge {
                size: s,
                max: self.max_file_size,
            }),
            _ => Ok(()),
        }
    }

    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = extension_of(filename)?;
        if self.allowed_extensions.contains(&extension) {
            Ok(())
        } else {
            Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            })
        }
    }

    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type.to_lowercase();
        if self.allowed_content_types.iter().any(|ct| *ct == normalized) {
            Ok(())
        } else {
            Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            })
        }
    }

    /// Reject uploads whose declared Content-Type does not belong to their
    /// extension. Catches spoofed payloads carrying a legitimate-looking
    /// type.
    pub fn validate_extension_content_type_match(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        let extension = extension_of(filename)?;

        let Some(expected) = content_types_for(&extension) else {
            tracing::debug!(
                extension = %extension,
                content_type = %content_type,
                "Unknown extension, skipping Content-Type cross-check"
            );
            return Ok(());
        };

        let normalized = content_type.to_lowercase();
        if expected.contains(&normalized.as_str()) {
            return Ok(());
        }

        Err(ValidationError::InvalidContentType {
            content_type: format!(
                "{} (does not match extension '{}'. Expected one of: {})",
                content_type,
                extension,
                expected.join(", ")
            ),
            allowed: self.allowed_content_types.clone(),
        })
    }

    /// Run every check on one file.
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_file_size(file_size)?;
        self.validate_extension(filename)?;
        self.validate_content_type(content_type)?;
        self.validate_extension_content_type_match(filename, content_type)
    }
}

/// Sanitize a client-supplied filename for use inside a storage key.
///
/// Strips any directory part, rejects `..`, replaces everything outside
/// `[alphanumeric . - _]`, and caps the length. Degenerate names collapse to
/// `"file"`.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;

    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if base.contains("..") {
        return "invalid_filename".to_string();
    }

    let cleaned: String = base
        .chars()
        .take(MAX)
        .map(|c| match c {
            c if c.is_alphanumeric() => c,
            '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    if cleaned.trim().is_empty() || cleaned.len() < 3 {
        "file".to_string()
    } else {
        cleaned
    }
}
