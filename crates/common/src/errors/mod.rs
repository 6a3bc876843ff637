//! Error types for scantron services
//!
//! Every handled failure is rendered through the shared response envelope
//! (`{"status": "error", "message": ..., "code": ...}`). Clients are expected to
//! branch on the envelope `status`, not on the HTTP status code: validation,
//! lookup and upload-processing failures are returned with HTTP 200, and only
//! download I/O and internal failures use a 5xx status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::response::ApiResponse;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    NoFilePart,
    NoSelectedFile,
    UnsupportedFileType,
    InvalidFormat,

    // Resource errors
    CsvNotFound,
    FileIdNotFound,

    // Processing errors
    ProcessingError,
    DownloadError,

    // Internal errors
    InternalError,
    ConfigurationError,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("No file part in the request")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Only PDF files are allowed")]
    UnsupportedFileType { filename: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Resource errors
    #[error("CSV file not found")]
    CsvNotFound { file_id: String },

    #[error("File ID not found")]
    FileIdNotFound { file_id: String },

    // Processing errors
    #[error("Error processing PDF: {message}")]
    Processing { message: String },

    #[error("Error downloading CSV: {0}")]
    Download(#[source] std::io::Error),

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NoFilePart => ErrorCode::NoFilePart,
            AppError::NoSelectedFile => ErrorCode::NoSelectedFile,
            AppError::UnsupportedFileType { .. } => ErrorCode::UnsupportedFileType,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::CsvNotFound { .. } => ErrorCode::CsvNotFound,
            AppError::FileIdNotFound { .. } => ErrorCode::FileIdNotFound,
            AppError::Processing { .. } => ErrorCode::ProcessingError,
            AppError::Download(_) => ErrorCode::DownloadError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Envelope-only errors: the body carries the failure
            AppError::NoFilePart |
            AppError::NoSelectedFile |
            AppError::UnsupportedFileType { .. } |
            AppError::InvalidFormat { .. } |
            AppError::CsvNotFound { .. } |
            AppError::FileIdNotFound { .. } |
            AppError::Processing { .. } => StatusCode::OK,

            // 500 Internal Server Error
            AppError::Download(_) |
            AppError::Internal { .. } |
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this failure originates on the server side
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AppError::Processing { .. }
                | AppError::Download(_)
                | AppError::Internal { .. }
                | AppError::Configuration { .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        (status, Json(ApiResponse::error(message, code))).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Processing {
            message: err.to_string()
        }
    }
}
