//! HTTP surface of the mock recognizer

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use scantron_common::{
    cors::cors_layer,
    errors::{AppError, Result},
    upload::read_upload,
    ApiResponse,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::recognizer::MockRecognizer;

/// Multipart text field echoed back in the result
const FILE_ID_FIELD: &str = "file_id";

pub fn create_router(
    recognizer: Arc<MockRecognizer>,
    allowed_origins: &[String],
    max_upload_bytes: usize,
) -> Router {
    Router::new()
        .route("/mock_ai", post(mock_ai))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(recognizer)
}

/// Fabricate students for an uploaded sheet.
///
/// Responds `{status: "success", data: {students, file_id}}`.
async fn mock_ai(
    State(recognizer): State<Arc<MockRecognizer>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>> {
    let multipart = multipart.map_err(|e| {
        debug!(error = %e, "Request is not a multipart upload");
        AppError::NoFilePart
    })?;

    let form = read_upload(multipart).await?;
    let file = form.pdf()?;
    let file_id = form.field(FILE_ID_FIELD).map(str::to_string);

    let recognition = recognizer.recognize(file, file_id).await?;
    recognizer.forward(&recognition).await;

    let data = serde_json::to_value(&recognition).map_err(|e| AppError::Internal {
        message: format!("Failed to serialize recognition result: {}", e),
    })?;

    Ok(Json(ApiResponse::success().with_data(data)))
}
