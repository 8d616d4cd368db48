//! Price calculator.
//!
//! `final = round(base + base * margin/100)` where
//! `base = (metal_cost + gemstone_cost) * work_coefficient`,
//! `metal_cost = weight_grams * rate_per_gram`,
//! `gemstone_cost = carat_weight * rate_per_carat`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cache::TtlCache;
use crate::rates::RateTable;
use crate::source::RateSource;

const DEFAULT_MARGIN_PCT: f64 = 50.0;
const DEFAULT_PRODUCT_TYPE: &str = "jewelry";

/// Quote errors
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Unknown metal combination: {key} (available: {available:?})")]
    UnknownMetal { key: String, available: Vec<String> },

    #[error("Invalid quote request: {0}")]
    InvalidRequest(String),
}

/// A quote request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PriceRequest {
    pub metal_type: String,
    pub metal_purity: String,
    /// Metal weight in grams.
    pub weight: f64,
    #[serde(default)]
    pub gemstone: Option<String>,
    /// Gemstone weight in carats.
    #[serde(default)]
    pub gemstone_weight: f64,
    #[serde(default = "default_product_type")]
    pub product_type: String,
    /// Margin percentage applied on top of the base price.
    #[serde(default = "default_margin")]
    pub margin: f64,
}

fn default_product_type() -> String {
    DEFAULT_PRODUCT_TYPE.to_string()
}

fn default_margin() -> f64 {
    DEFAULT_MARGIN_PCT
}

/// Rates a quote was computed from.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceBreakdown {
    pub metal_rate: f64,
    pub gemstone_rate: f64,
    pub work_coefficient: f64,
}

/// A computed quote. Component costs are rounded to whole rubles.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceQuote {
    pub metal_cost: i64,
    pub gemstone_cost: i64,
    pub work_cost: i64,
    pub base_price: i64,
    pub margin: i64,
    pub final_price: i64,
    pub breakdown: PriceBreakdown,
}

/// Price calculator with a cached external rate source and local fallback.
pub struct PriceCalculator {
    source: Arc<dyn RateSource>,
    cache: TtlCache<RateTable>,
}

impl PriceCalculator {
    pub fn new(source: Arc<dyn RateSource>, cache_ttl: Duration) -> Self {
        PriceCalculator {
            source,
            cache: TtlCache::new(cache_ttl),
        }
    }

    /// Current rates: the cached external table when available, the local
    /// fallback when the source fails.
    pub async fn current_rates(&self) -> RateTable {
        let source = Arc::clone(&self.source);
        match self.cache.get_or_refresh(|| async move { source.fetch().await }).await {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(error = %err, "Rate source unavailable, using local fallback");
                RateTable::local_fallback()
            }
        }
    }

    /// Compute a quote against the current rates.
    pub async fn quote(&self, request: &PriceRequest) -> Result<PriceQuote, QuoteError> {
        if request.metal_type.is_empty() || request.metal_purity.is_empty() {
            return Err(QuoteError::InvalidRequest(
                "metal_type and metal_purity are required".to_string(),
            ));
        }
        if request.weight <= 0.0 {
            return Err(QuoteError::InvalidRequest(
                "weight must be positive".to_string(),
            ));
        }

        let rates = self.current_rates().await;

        let metal_rate = rates
            .metal_rate(&request.metal_type, &request.metal_purity)
            .ok_or_else(|| QuoteError::UnknownMetal {
                key: format!("{}_{}", request.metal_type, request.metal_purity),
                available: rates.metal_rates.keys().cloned().collect(),
            })?;

        let gemstone_rate = request
            .gemstone
            .as_deref()
            .map(|g| rates.gemstone_rate(g))
            .unwrap_or(0.0);
        let work_coefficient = rates.work_coefficient(&request.product_type);

        let metal_cost = request.weight * metal_rate;
        let gemstone_cost = request.gemstone_weight * gemstone_rate;
        let base_price = (metal_cost + gemstone_cost) * work_coefficient;
        let margin_amount = base_price * (request.margin / 100.0);
        let final_price = (base_price + margin_amount).round() as i64;

        Ok(PriceQuote {
            metal_cost: metal_cost.round() as i64,
            gemstone_cost: gemstone_cost.round() as i64,
            work_cost: ((metal_cost + gemstone_cost) * (work_coefficient - 1.0)).round() as i64,
            base_price: base_price.round() as i64,
            margin: margin_amount.round() as i64,
            final_price,
            breakdown: PriceBreakdown {
                metal_rate,
                gemstone_rate,
                work_coefficient,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RateError, StaticRateSource};
    use async_trait::async_trait;

    fn calculator() -> PriceCalculator {
        PriceCalculator::new(
            Arc::new(StaticRateSource::new(RateTable::local_fallback())),
            Duration::from_secs(300),
        )
    }

    fn request() -> PriceRequest {
        PriceRequest {
            metal_type: "gold".to_string(),
            metal_purity: "585".to_string(),
            weight: 3.5,
            gemstone: None,
            gemstone_weight: 0.0,
            product_type: "ring".to_string(),
            margin: 50.0,
        }
    }

    #[tokio::test]
    async fn test_quote_metal_only() {
        let quote = calculator().quote(&request()).await.unwrap();

        // 3.5g * 4500 = 15750; base = 15750 * 1.3 = 20475; margin 50% = 10237.5
        assert_eq!(quote.metal_cost, 15750);
        assert_eq!(quote.gemstone_cost, 0);
        assert_eq!(quote.base_price, 20475);
        assert_eq!(quote.margin, 10238);
        assert_eq!(quote.final_price, 30713);
        assert_eq!(quote.breakdown.metal_rate, 4500.0);
        assert_eq!(quote.breakdown.work_coefficient, 1.3);
    }

    #[tokio::test]
    async fn test_quote_with_gemstone() {
        let mut req = request();
        req.gemstone = Some("diamond".to_string());
        req.gemstone_weight = 0.5;

        let quote = calculator().quote(&req).await.unwrap();
        assert_eq!(quote.gemstone_cost, 75000);
        assert_eq!(quote.breakdown.gemstone_rate, 150000.0);
        // base = (15750 + 75000) * 1.3 = 117975
        assert_eq!(quote.base_price, 117975);
    }

    #[tokio::test]
    async fn test_quote_unknown_metal() {
        let mut req = request();
        req.metal_purity = "123".to_string();

        let err = calculator().quote(&req).await.unwrap_err();
        match err {
            QuoteError::UnknownMetal { key, available } => {
                assert_eq!(key, "gold_123");
                assert!(available.contains(&"gold_585".to_string()));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_quote_rejects_nonpositive_weight() {
        let mut req = request();
        req.weight = 0.0;
        assert!(matches!(
            calculator().quote(&req).await,
            Err(QuoteError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_request_defaults() {
        let json = r#"{ "metal_type": "gold", "metal_purity": "585", "weight": 1.0 }"#;
        let req: PriceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.margin, 50.0);
        assert_eq!(req.product_type, "jewelry");
        assert_eq!(req.gemstone_weight, 0.0);
    }

    struct FailingSource;

    #[async_trait]
    impl RateSource for FailingSource {
        async fn fetch(&self) -> Result<RateTable, RateError> {
            Err(RateError::Malformed("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fallback_when_source_fails() {
        let calculator =
            PriceCalculator::new(Arc::new(FailingSource), Duration::from_secs(300));

        let quote = calculator.quote(&request()).await.unwrap();
        // Local fallback table still answers
        assert_eq!(quote.breakdown.metal_rate, 4500.0);
    }
}
