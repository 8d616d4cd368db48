//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use aurelia_core::Config;
use aurelia_ledger::MediaLedger;
use aurelia_pricing::{HttpRateSource, PriceCalculator, RateSource, RateTable, StaticRateSource};

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    let storage = storage::setup_storage(&config).await?;

    let ledger = Arc::new(MediaLedger::new(config.ledger_path()));

    let rate_source: Arc<dyn RateSource> = match config.rates_url() {
        Some(url) => Arc::new(HttpRateSource::new(url.to_string())),
        None => {
            tracing::info!("No METAL_RATES_URL configured, pricing uses the local rate table");
            Arc::new(StaticRateSource::new(RateTable::local_fallback()))
        }
    };
    let pricing = Arc::new(PriceCalculator::new(
        rate_source,
        Duration::from_secs(config.rates_cache_ttl_secs()),
    ));

    let state = Arc::new(AppState {
        is_production: config.is_production(),
        config: config.clone(),
        storage,
        ledger,
        pricing,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
