//! Connectivity check handlers used by the frontend

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use scantron_common::{errors::{AppError, Result}, ApiResponse};

#[derive(Serialize)]
pub struct DataResponse {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub message: String,
}

pub async fn get_data() -> Json<DataResponse> {
    Json(DataResponse {
        message: "Hello from the scantron app server!".to_string(),
    })
}

/// Log a client message
pub async fn receive_message(
    payload: std::result::Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidFormat {
        message: e.body_text(),
    })?;

    info!(message = %request.message, "Received message");

    Ok(Json(
        ApiResponse::success().with_message("Message received successfully!"),
    ))
}
