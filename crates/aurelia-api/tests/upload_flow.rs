//! End-to-end upload flow tests.
//!
//! Run with: `cargo test -p aurelia-api --test upload_flow`
//! Uses local storage and a temp-dir ledger; no external services required.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::Router;
use http::{header, Request, StatusCode};
use tempfile::TempDir;
use tower::util::ServiceExt;

use aurelia_api::setup::routes::setup_routes;
use aurelia_api::state::AppState;
use aurelia_core::config::{Config, MediaBackendConfig};
use aurelia_core::StorageBackend;
use aurelia_ledger::MediaLedger;
use aurelia_pricing::{PriceCalculator, RateTable, StaticRateSource};
use aurelia_storage::LocalStorage;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn test_config(dir: &TempDir) -> Config {
    Config(Box::new(MediaBackendConfig {
        server_port: 3000,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: dir.path().join("media").display().to_string(),
        local_storage_base_url: "http://localhost:3000/media".to_string(),
        max_file_size_bytes: 10 * 1024 * 1024,
        max_batch_files: 10,
        upload_concurrency: 4,
        allowed_extensions: vec![
            "jpg".to_string(),
            "jpeg".to_string(),
            "png".to_string(),
            "gif".to_string(),
            "webp".to_string(),
            "svg".to_string(),
        ],
        allowed_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/gif".to_string(),
            "image/webp".to_string(),
            "image/svg+xml".to_string(),
        ],
        webp_quality: 85,
        max_image_width: 2560,
        max_image_height: 2560,
        ledger_path: dir.path().join("media-backup.json").display().to_string(),
        rates_url: None,
        rates_cache_ttl_secs: 300,
    }))
}

async fn test_app(dir: &TempDir) -> (Router, Arc<AppState>) {
    let config = test_config(dir);

    let storage = Arc::new(
        LocalStorage::new(
            config.local_storage_path().to_string(),
            config.local_storage_base_url().to_string(),
        )
        .await
        .unwrap(),
    );
    let ledger = Arc::new(MediaLedger::new(config.ledger_path()));
    let pricing = Arc::new(PriceCalculator::new(
        Arc::new(StaticRateSource::new(RateTable::local_fallback())),
        Duration::from_secs(300),
    ));

    let state = Arc::new(AppState {
        is_production: false,
        config: config.clone(),
        storage,
        ledger,
        pricing,
    });

    let router = setup_routes(&config, state.clone()).unwrap();
    (router, state)
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .unwrap();
    buffer
}

fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/admin/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(&dir).await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_batch_of_two_jpegs_both_converted() {
    let dir = TempDir::new().unwrap();
    let (app, state) = test_app(&dir).await;

    let a = jpeg_bytes(64, 64);
    let b = jpeg_bytes(48, 32);
    let response = app
        .oneshot(upload_request(&[
            ("ring.jpg", "image/jpeg", &a),
            ("band.jpg", "image/jpeg", &b),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);

    for file in files {
        assert_eq!(file["isWebP"], true);
        assert_eq!(file["mimeType"], "image/webp");
        assert!(file["key"].as_str().unwrap().ends_with(".webp"));
        assert!(file["url"].as_str().unwrap().contains("/uploads/"));
    }

    let (entries, total) = state.ledger.list(None, 100, 0).await.unwrap();
    assert_eq!(total, 2);
    assert!(entries.iter().all(|e| e.is_webp));
}

#[tokio::test]
async fn test_corrupt_file_stored_unconverted_next_to_valid_one() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(&dir).await;

    let valid = jpeg_bytes(32, 32);
    let response = app
        .oneshot(upload_request(&[
            ("broken.jpg", "image/jpeg", b"not a real jpeg"),
            ("fine.jpg", "image/jpeg", &valid),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let files = json["files"].as_array().unwrap();

    // Corrupt input falls back to the original bytes, not a failure.
    assert_eq!(files[0]["isWebP"], false);
    assert_eq!(files[0]["mimeType"], "image/jpeg");
    assert_eq!(files[1]["isWebP"], true);
}

#[tokio::test]
async fn test_oversized_image_fits_bounding_box() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(&dir).await;

    // 3000x1500 exceeds the 2560 bound; 2:1 ratio must survive the downscale.
    let big = jpeg_bytes(3000, 1500);
    let response = app
        .oneshot(upload_request(&[("panorama.jpg", "image/jpeg", &big)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let file = &json["files"][0];
    let width = file["width"].as_u64().unwrap();
    let height = file["height"].as_u64().unwrap();
    assert!(width.max(height) <= 2560);
    assert_eq!(width, 2560);
    assert!((height as i64 - 1280).abs() <= 1);
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(&dir).await;

    let response = app.oneshot(upload_request(&[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disallowed_extension_rejected_before_processing() {
    let dir = TempDir::new().unwrap();
    let (app, state) = test_app(&dir).await;

    let response = app
        .oneshot(upload_request(&[(
            "malware.exe",
            "application/octet-stream",
            b"MZ",
        )]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing reached the ledger.
    let (_, total) = state.ledger.list(None, 100, 0).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_ledger_roundtrip_and_csv_export() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(&dir).await;

    let data = jpeg_bytes(16, 16);
    let response = app
        .clone()
        .oneshot(upload_request(&[("ring, gold.jpg", "image/jpeg", &data)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::get("/admin/media-backup")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["version"], "1.0");
    assert_eq!(json["total"], 1);
    // The ledger keeps the client's original filename.
    assert_eq!(json["entries"][0]["original_filename"], "ring, gold.jpg");

    let response = app
        .oneshot(
            Request::get("/admin/media-backup?format=csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("id,product_id,url,s3_key,original_filename"));
    assert!(csv.contains("\"ring, gold.jpg\""));
}

#[tokio::test]
async fn test_remove_missing_key_returns_zero_and_keeps_entries() {
    let dir = TempDir::new().unwrap();
    let (app, state) = test_app(&dir).await;

    let data = jpeg_bytes(16, 16);
    app.clone()
        .oneshot(upload_request(&[("a.jpg", "image/jpeg", &data)]))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::delete("/admin/media-backup?s3_key=uploads/never-existed.webp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["deleted"], 0);

    let (_, total) = state.ledger.list(None, 100, 0).await.unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_remove_requires_exactly_one_selector() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(&dir).await;

    let response = app
        .clone()
        .oneshot(
            Request::delete("/admin/media-backup")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::delete("/admin/media-backup?id=x&s3_key=y")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ledger_ingest_skips_rows_missing_key() {
    let dir = TempDir::new().unwrap();
    let (app, state) = test_app(&dir).await;

    let body = serde_json::json!([
        { "url": "https://cdn.example.com/a.webp", "s3_key": "uploads/a.webp" },
        { "url": "https://cdn.example.com/b.webp" },
        { "s3_key": "uploads/c.webp" }
    ]);
    let response = app
        .oneshot(
            Request::post("/admin/media-backup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    assert_eq!(json["added"], 1);
    assert_eq!(json["total"], 1);

    let (entries, _) = state.ledger.list(None, 100, 0).await.unwrap();
    assert_eq!(entries[0].s3_key, "uploads/a.webp");
    assert_eq!(entries[0].original_filename, "unknown");
}

#[tokio::test]
async fn test_delete_file_endpoint() {
    let dir = TempDir::new().unwrap();
    let (app, state) = test_app(&dir).await;

    let data = jpeg_bytes(16, 16);
    let response = app
        .clone()
        .oneshot(upload_request(&[("a.jpg", "image/jpeg", &data)]))
        .await
        .unwrap();
    let json = json_body(response).await;
    let key = json["files"][0]["key"].as_str().unwrap().to_string();
    assert!(state.storage.exists(&key).await.unwrap());

    let body = serde_json::json!({ "file_key": key });
    let response = app
        .oneshot(
            Request::post("/admin/uploads/delete")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["deleted"], true);
    assert!(!state.storage.exists(&key).await.unwrap());
}

#[tokio::test]
async fn test_price_quote_and_unknown_metal() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(&dir).await;

    let body = serde_json::json!({
        "metal_type": "gold",
        "metal_purity": "585",
        "weight": 3.5,
        "product_type": "ring"
    });
    let response = app
        .clone()
        .oneshot(
            Request::post("/admin/price-calculator")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["metal_cost"], 15750);
    assert_eq!(json["final_price"], 30713);
    assert_eq!(json["breakdown"]["work_coefficient"], 1.3);

    let body = serde_json::json!({
        "metal_type": "gold",
        "metal_purity": "123",
        "weight": 1.0
    });
    let response = app
        .oneshot(
            Request::post("/admin/price-calculator")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rates_endpoint() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(&dir).await;

    let response = app
        .oneshot(
            Request::get("/admin/price-calculator")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["metal_rates"]["gold_585"], 4500.0);
    assert!(json["work_coefficients"]["ring"].as_f64().unwrap() > 1.0);
}
