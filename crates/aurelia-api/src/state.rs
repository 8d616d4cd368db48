//! Application state shared across handlers.

use std::sync::Arc;

use aurelia_core::Config;
use aurelia_ledger::MediaLedger;
use aurelia_pricing::PriceCalculator;
use aurelia_processing::ProcessingOptions;
use aurelia_storage::Storage;

/// Main application state: configuration plus the pipeline collaborators.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub ledger: Arc<MediaLedger>,
    pub pricing: Arc<PriceCalculator>,
    pub is_production: bool,
}

impl AppState {
    /// Processing options derived from configuration.
    pub fn processing_options(&self) -> ProcessingOptions {
        ProcessingOptions {
            quality: self.config.webp_quality(),
            max_width: self.config.max_image_width(),
            max_height: self.config.max_image_height(),
            ..Default::default()
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
