//! Router assembly: endpoints, CORS, body limits, tracing.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use aurelia_core::Config;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    // A full batch plus multipart framing must fit in one request body.
    let body_limit = config.max_file_size_bytes() * config.max_batch_files() + 1024 * 1024;

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/admin/uploads",
            post(handlers::uploads::upload_files).get(handlers::uploads::upload_info),
        )
        .route(
            "/admin/uploads/delete",
            post(handlers::uploads_delete::delete_file),
        )
        .route(
            "/admin/media-backup",
            get(handlers::media_ledger::list_entries)
                .post(handlers::media_ledger::add_entries)
                .delete(handlers::media_ledger::remove_entries),
        )
        .route(
            "/admin/price-calculator",
            post(handlers::price_calculator::quote).get(handlers::price_calculator::current_rates),
        )
        .route("/api/openapi.json", get(openapi_json))
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    if config.cors_origins().contains(&"*".to_string()) {
        tracing::warn!("CORS allows all origins; restrict CORS_ORIGINS in production");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any)
}
