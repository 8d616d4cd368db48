//! Storage initialization.

use std::sync::Arc;

use anyhow::{Context, Result};

use aurelia_core::Config;
use aurelia_storage::{create_storage, Storage};

/// Create the configured storage backend.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(backend = %storage.backend_type(), "Storage initialized");

    Ok(storage)
}
