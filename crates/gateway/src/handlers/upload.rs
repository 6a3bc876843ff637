//! PDF upload handler

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::debug;

use crate::AppState;
use scantron_common::{
    errors::{AppError, Result},
    metrics,
    upload::read_upload,
    ApiResponse,
};

/// Accept a scanned answer sheet and convert it to CSV.
///
/// Responds `{status: "success", file_id, data: <csv filename>}`; `data` is
/// empty when extraction failed and no CSV exists for the id.
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>> {
    let multipart = multipart.map_err(|e| {
        debug!(error = %e, "Request is not a multipart upload");
        AppError::NoFilePart
    })?;

    let form = read_upload(multipart).await.inspect_err(|_| metrics::record_upload("rejected"))?;
    let file = form.pdf().inspect_err(|_| metrics::record_upload("rejected"))?;

    let outcome = state
        .intake
        .accept(file)
        .await
        .inspect_err(|_| metrics::record_upload("failed"))?;

    metrics::record_upload(if outcome.produced_csv() { "processed" } else { "empty" });

    Ok(Json(
        ApiResponse::success()
            .with_message("PDF processed successfully")
            .with_file_id(outcome.file_id.to_string())
            .with_data(outcome.csv_filename),
    ))
}
