//! Scantron App Server
//!
//! Entry point for the intake/retrieval API.

use anyhow::Context;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use scantron_common::{
    config::AppConfig,
    extraction::create_extractor,
    metrics::{self, EXTRACTION_BUCKETS, METRICS_PREFIX},
    VERSION,
};
use scantron_gateway::{create_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_new(&config.observability.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("Starting scantron app server v{}", VERSION);

    let config = Arc::new(config);

    // Upload directory holds transient PDFs and generated CSVs
    tokio::fs::create_dir_all(&config.storage.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.storage.upload_dir.display()))?;
    info!(upload_dir = %config.storage.upload_dir.display(), "Upload directory ready");

    // Initialize metrics
    let metrics_handle = if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(format!("{}_extraction_duration_seconds", METRICS_PREFIX)),
                EXTRACTION_BUCKETS,
            )?
            .install_recorder()?;
        Some(handle)
    } else {
        None
    };
    metrics::register_metrics();

    // Initialize extraction backend
    let extractor = create_extractor(&config.extractor)?;
    info!(
        provider = extractor.name(),
        timeout_secs = config.extractor.timeout_secs,
        "Extractor ready"
    );

    // Create app state
    let mut state = AppState::new(config.clone(), extractor);
    if let Some(handle) = metrics_handle {
        state = state.with_metrics(handle);
    }

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
