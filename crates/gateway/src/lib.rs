//! Scantron App Server
//!
//! HTTP surface for the scantron pipeline:
//! - PDF intake, answer extraction, and CSV conversion (`/api/upload`)
//! - CSV download and receipt acknowledgment
//! - Health and Prometheus metrics endpoints

pub mod handlers;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use scantron_common::{config::AppConfig, cors::cors_layer, Extractor, UploadStore};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use services::{IntakeService, RetrievalService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<UploadStore>,
    pub intake: Arc<IntakeService>,
    pub retrieval: Arc<RetrievalService>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, extractor: Arc<dyn Extractor>) -> Self {
        let store = Arc::new(UploadStore::new());

        Self {
            intake: Arc::new(IntakeService::new(
                store.clone(),
                extractor,
                config.storage.upload_dir.clone(),
                config.extraction_timeout(),
            )),
            retrieval: Arc::new(RetrievalService::new(store.clone())),
            store,
            config,
            metrics: None,
        }
    }

    /// Serve the given recorder at `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors.allowed_origins);
    let body_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);

    // API routes
    let api_routes = Router::new()
        .route("/data", get(handlers::misc::get_data))
        .route("/message", post(handlers::misc::receive_message))
        .route("/upload", post(handlers::upload::upload))
        .route("/download_csv/{file_id}", get(handlers::download::download_csv))
        .route(
            "/csv_acknowledgment/{file_id}",
            post(handlers::acknowledgment::csv_acknowledgment),
        );

    // Compose the app
    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::health::metrics))
        .layer(body_limit)
        .layer(
            ServiceBuilder::new()
                // Request ID propagation
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
