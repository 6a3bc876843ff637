//! CSV download handler

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::AppState;
use scantron_common::{errors::Result, metrics, AppError, FileId};

/// Stream the CSV generated for `file_id` as an attachment
pub async fn download_csv(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Response> {
    let file_id = FileId::from(file_id);

    let download = state.retrieval.download(&file_id).await.inspect_err(|e| {
        metrics::record_download(match e {
            AppError::CsvNotFound { .. } => "not_found",
            _ => "error",
        })
    })?;

    metrics::record_download("served");

    let content_disposition = format!("attachment; filename=\"{}\"", download.filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition),
        ],
        download.bytes,
    )
        .into_response())
}
