//! Request-acceptance validation for upload batches.
//!
//! Runs before any processing begins: batch size, per-file size, extension
//! and content-type checks. A batch that fails here is rejected wholesale.

use aurelia_core::Config;
use aurelia_processing::{MediaValidator, ValidationError};

use crate::services::upload::UploadedPart;

/// Validate a whole upload batch against the configured limits.
pub fn validate_batch(config: &Config, files: &[UploadedPart]) -> Result<(), ValidationError> {
    if files.len() > config.max_batch_files() {
        return Err(ValidationError::TooManyFiles {
            count: files.len(),
            max: config.max_batch_files(),
        });
    }

    let validator = MediaValidator::new(
        config.max_file_size_bytes(),
        config.allowed_extensions().to_vec(),
        config.allowed_content_types().to_vec(),
    );

    for file in files {
        validator.validate_all(&file.filename, &file.content_type, file.data.len())?;
    }

    Ok(())
}
