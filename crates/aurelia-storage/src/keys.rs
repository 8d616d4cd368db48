//! Shared key generation for storage backends.
//!
//! Key format: `uploads/{unix_millis}-{token}-{filename}`. The token comes
//! from a CSPRNG so keys stay unique even for files uploaded within the same
//! millisecond in the same batch.

use aurelia_core::constants::UPLOAD_KEY_PREFIX;
use rand::distr::Alphanumeric;
use rand::Rng;

const TOKEN_LEN: usize = 6;

/// Generate a short lowercase alphanumeric token.
pub fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Generate a storage key for an upload with the given (already sanitized)
/// filename.
pub fn generate_upload_key(filename: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    format!(
        "{}/{}-{}-{}",
        UPLOAD_KEY_PREFIX,
        timestamp,
        random_token(TOKEN_LEN),
        filename
    )
}
