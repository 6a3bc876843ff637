//! CSV receipt acknowledgment handler

use axum::{
    extract::{Path, State},
    Json,
};

use crate::AppState;
use scantron_common::{errors::Result, metrics, ApiResponse, FileId};

/// Record that the client received the CSV for `file_id`. Repeats are fine.
pub async fn csv_acknowledgment(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let file_id = FileId::from(file_id);

    state
        .retrieval
        .acknowledge(&file_id)
        .await
        .inspect_err(|_| metrics::record_acknowledgment("not_found"))?;

    metrics::record_acknowledgment("acknowledged");

    Ok(Json(
        ApiResponse::success().with_message("CSV receipt acknowledged"),
    ))
}
