//! Jewelry price calculator endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::json;

use aurelia_pricing::{PriceQuote, PriceRequest};

use crate::error::HttpAppError;
use crate::state::AppState;

/// Compute a price quote from metal, gemstone, and work parameters.
#[utoipa::path(
    post,
    path = "/admin/price-calculator",
    tag = "pricing",
    request_body = PriceRequest,
    responses(
        (status = 200, description = "Computed quote", body = PriceQuote),
        (status = 400, description = "Unknown metal or invalid parameters", body = crate::error::ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "price_quote"))]
pub async fn quote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PriceRequest>,
) -> Result<Json<PriceQuote>, HttpAppError> {
    let quote = state.pricing.quote(&request).await?;
    Ok(Json(quote))
}

/// Current rate tables (external source when reachable, local fallback
/// otherwise).
#[utoipa::path(
    get,
    path = "/admin/price-calculator",
    tag = "pricing",
    responses((status = 200, description = "Current rates"))
)]
pub async fn current_rates(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let rates = state.pricing.current_rates().await;
    Json(json!({
        "metal_rates": rates.metal_rates,
        "gemstone_rates": rates.gemstone_rates,
        "work_coefficients": rates.work_coefficients,
        "updated_at": chrono::Utc::now(),
    }))
}
