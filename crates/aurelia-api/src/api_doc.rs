//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use aurelia_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aurelia API",
        version = "0.1.0",
        description = "Jewelry storefront media backend: batch image uploads with WebP \
                       normalization, a durable media ledger for recovery, and a price \
                       calculator for jewelry goods."
    ),
    paths(
        handlers::uploads::upload_files,
        handlers::uploads::upload_info,
        handlers::uploads_delete::delete_file,
        handlers::media_ledger::list_entries,
        handlers::media_ledger::add_entries,
        handlers::media_ledger::remove_entries,
        handlers::price_calculator::quote,
        handlers::price_calculator::current_rates,
        handlers::health::health,
    ),
    components(schemas(
        models::MediaEntry,
        models::UploadedFile,
        models::UploadFileFailure,
        models::UploadFileResult,
        models::UploadResponse,
        handlers::uploads_delete::DeleteFileRequest,
        handlers::media_ledger::IngestEntry,
        handlers::media_ledger::IngestBody,
        aurelia_pricing::PriceRequest,
        aurelia_pricing::PriceQuote,
        aurelia_pricing::PriceBreakdown,
        aurelia_pricing::RateTable,
        error::ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "Batch file uploads with WebP conversion"),
        (name = "media-backup", description = "Durable upload ledger for recovery"),
        (name = "pricing", description = "Jewelry price quotes"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;
