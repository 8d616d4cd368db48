//! Configuration module
//!
//! This module provides the environment-driven configuration for the API and
//! the upload pipeline: server settings, storage backend selection, media
//! limits, ledger location, and the external pricing source.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_FILE_SIZE_MB: usize = 10;
const DEFAULT_MAX_BATCH_FILES: usize = 10;
const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;
const DEFAULT_RATES_CACHE_TTL_SECS: u64 = 300;

/// Application configuration for the media backend.
#[derive(Clone, Debug)]
pub struct MediaBackendConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Upload limits
    pub max_file_size_bytes: usize,
    pub max_batch_files: usize,
    pub upload_concurrency: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    // Image normalization
    pub webp_quality: u8,
    pub max_image_width: u32,
    pub max_image_height: u32,
    // Media ledger
    pub ledger_path: String,
    // Pricing rate source
    pub rates_url: Option<String>,
    pub rates_cache_ttl_secs: u64,
}

/// Application configuration (media backend).
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaBackendConfig>);

impl Config {
    fn inner(&self) -> &MediaBackendConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "jpg,jpeg,png,gif,webp,svg".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| {
                "image/jpeg,image/png,image/gif,image/webp,image/svg+xml".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .map(|v| v.parse::<StorageBackend>())
            .transpose()?;

        let local_storage_base_url = env::var("LOCAL_STORAGE_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}/media", server_port));

        let config = MediaBackendConfig {
            server_port,
            cors_origins,
            environment,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "data/media".to_string()),
            local_storage_base_url,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_batch_files: env::var("MAX_BATCH_FILES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BATCH_FILES),
            upload_concurrency: env::var("UPLOAD_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_CONCURRENCY),
            allowed_extensions,
            allowed_content_types,
            webp_quality: env::var("WEBP_QUALITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::constants::DEFAULT_WEBP_QUALITY),
            max_image_width: env::var("MAX_IMAGE_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::constants::DEFAULT_MAX_WIDTH),
            max_image_height: env::var("MAX_IMAGE_HEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::constants::DEFAULT_MAX_HEIGHT),
            ledger_path: env::var("MEDIA_LEDGER_PATH")
                .unwrap_or_else(|_| "data/media-backup.json".to_string()),
            rates_url: env::var("METAL_RATES_URL").ok(),
            rates_cache_ttl_secs: env::var("RATES_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RATES_CACHE_TTL_SECS),
        };

        let config = Config(Box::new(config));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let c = self.inner();
        if c.webp_quality == 0 || c.webp_quality > 100 {
            anyhow::bail!("WEBP_QUALITY must be within 1..=100, got {}", c.webp_quality);
        }
        if c.max_image_width == 0 || c.max_image_height == 0 {
            anyhow::bail!("MAX_IMAGE_WIDTH / MAX_IMAGE_HEIGHT must be non-zero");
        }
        if c.max_batch_files == 0 {
            anyhow::bail!("MAX_BATCH_FILES must be non-zero");
        }
        if c.upload_concurrency == 0 {
            anyhow::bail!("UPLOAD_CONCURRENCY must be non-zero");
        }
        if c.max_file_size_bytes == 0 {
            anyhow::bail!("MAX_FILE_SIZE_MB must be non-zero");
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.inner().local_storage_base_url
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes
    }

    pub fn max_batch_files(&self) -> usize {
        self.inner().max_batch_files
    }

    pub fn upload_concurrency(&self) -> usize {
        self.inner().upload_concurrency
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.inner().allowed_extensions
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.inner().allowed_content_types
    }

    pub fn webp_quality(&self) -> u8 {
        self.inner().webp_quality
    }

    pub fn max_image_width(&self) -> u32 {
        self.inner().max_image_width
    }

    pub fn max_image_height(&self) -> u32 {
        self.inner().max_image_height
    }

    pub fn ledger_path(&self) -> &str {
        &self.inner().ledger_path
    }

    pub fn rates_url(&self) -> Option<&str> {
        self.inner().rates_url.as_deref()
    }

    pub fn rates_cache_ttl_secs(&self) -> u64 {
        self.inner().rates_cache_ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> MediaBackendConfig {
        MediaBackendConfig {
            server_port: 3000,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            storage_backend: Some(StorageBackend::Local),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: "data/media".to_string(),
            local_storage_base_url: "http://localhost:3000/media".to_string(),
            max_file_size_bytes: 10 * 1024 * 1024,
            max_batch_files: 10,
            upload_concurrency: 4,
            allowed_extensions: vec!["jpg".to_string(), "png".to_string()],
            allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            webp_quality: 85,
            max_image_width: 2560,
            max_image_height: 2560,
            ledger_path: "data/media-backup.json".to_string(),
            rates_url: None,
            rates_cache_ttl_secs: 300,
        }
    }

    #[test]
    fn test_validate_ok() {
        let config = Config(Box::new(base_config()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let mut c = base_config();
        c.webp_quality = 0;
        assert!(Config(Box::new(c)).validate().is_err());

        let mut c = base_config();
        c.webp_quality = 101;
        assert!(Config(Box::new(c)).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut c = base_config();
        c.max_batch_files = 0;
        assert!(Config(Box::new(c)).validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let mut c = base_config();
        c.environment = "Production".to_string();
        assert!(Config(Box::new(c)).is_production());

        let c = base_config();
        assert!(!Config(Box::new(c)).is_production());
    }
}
