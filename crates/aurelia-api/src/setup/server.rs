//! Server startup and graceful shutdown.

use anyhow::Result;
use axum::Router;
use aurelia_core::Config;

/// Bind the listener and serve until SIGINT/SIGTERM.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %addr,
        backend = ?config.storage_backend(),
        max_file_mb = config.max_file_size_bytes() / 1024 / 1024,
        max_batch_files = config.max_batch_files(),
        webp_quality = config.webp_quality(),
        bounding_box = %format!("{}x{}", config.max_image_width(), config.max_image_height()),
        ledger_path = %config.ledger_path(),
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves when the process receives SIGINT (Ctrl+C) or SIGTERM.
///
/// Panics if a handler cannot be installed; without one the process cannot
/// shut down cleanly anyway.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
