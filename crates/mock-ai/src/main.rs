//! Scantron Mock Recognizer
//!
//! Development stand-in for the answer recognition service:
//! 1. Receives a scanned sheet on `POST /mock_ai`
//! 2. Counts its pages
//! 3. Fabricates one student per page
//! 4. Optionally pushes the result to a forward URL

mod handlers;
mod recognizer;

use anyhow::Context;
use scantron_common::{config::AppConfig, VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use recognizer::MockRecognizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

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

    info!("Starting scantron mock recognizer v{}", VERSION);

    let mock = &config.mock_ai;
    tokio::fs::create_dir_all(&mock.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", mock.upload_dir.display()))?;

    let recognizer = MockRecognizer::new(mock, config.forward_timeout())
        .context("Failed to build forward client")?;
    if let Some(url) = &mock.forward_url {
        info!(url = %url, "Forwarding results");
    }

    let app = handlers::create_router(
        Arc::new(recognizer),
        &mock.allowed_origins,
        config.server.max_upload_bytes,
    );

    let addr: SocketAddr = format!("{}:{}", mock.host, mock.port)
        .parse()
        .context("Invalid server address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Mock recognizer shutting down");
        })
        .await?;

    Ok(())
}
