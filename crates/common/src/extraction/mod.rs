//! Answer extraction abstraction
//!
//! The recognizer is an opaque collaborator: a validated PDF path goes in and
//! student answer data comes out. Callers only look at success or failure.
//!
//! Providers:
//! - `remote`: posts the sheet to a recognition service over HTTP
//! - `synthetic`: fabricates one student per page, in process

mod remote;
mod synthetic;

pub use remote::RemoteExtractor;
pub use synthetic::{count_pages, generate_student, generate_students, SyntheticExtractor};

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ExtractorConfig;
use crate::errors::{AppError, Result};
use crate::models::StudentData;

/// Extraction failures. Never shown to clients; the intake pipeline degrades
/// them to an empty CSV result.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("PDF parse error for {path}: {message}")]
    PdfParse { path: String, message: String },

    #[error("Recognizer request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Recognizer returned an error: {message}")]
    Upstream { message: String },

    #[error("Malformed recognizer response: {message}")]
    MalformedResponse { message: String },

    #[error("Extraction timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractionError::PdfParse { .. } => "pdf_parse",
            ExtractionError::Transport(_) => "transport",
            ExtractionError::Upstream { .. } => "upstream",
            ExtractionError::MalformedResponse { .. } => "malformed_response",
            ExtractionError::Timeout { .. } => "timeout",
            ExtractionError::Io(_) => "io",
        }
    }
}

/// Trait for answer sheet recognition
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract per-student answers from the PDF at `path`
    async fn extract(&self, path: &Path) -> std::result::Result<StudentData, ExtractionError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Create an extractor based on configuration
pub fn create_extractor(config: &ExtractorConfig) -> Result<Arc<dyn Extractor>> {
    match config.provider.as_str() {
        "remote" => {
            let extractor = RemoteExtractor::new(config.endpoint.clone()).map_err(|e| {
                AppError::Configuration {
                    message: format!("Failed to build recognizer client: {}", e),
                }
            })?;
            Ok(Arc::new(extractor))
        }
        "synthetic" => Ok(Arc::new(SyntheticExtractor::new(config.questions_per_sheet))),
        other => {
            tracing::warn!(provider = other, "Unknown extraction provider, using synthetic");
            Ok(Arc::new(SyntheticExtractor::new(config.questions_per_sheet)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_extractor_by_provider() {
        let mut config = ExtractorConfig::default();
        assert_eq!(create_extractor(&config).unwrap().name(), "synthetic");

        config.provider = "remote".to_string();
        assert_eq!(create_extractor(&config).unwrap().name(), "remote");

        config.provider = "ocr-9000".to_string();
        assert_eq!(create_extractor(&config).unwrap().name(), "synthetic");
    }

    #[test]
    fn test_failure_reasons() {
        assert_eq!(ExtractionError::Timeout { timeout_secs: 5 }.reason(), "timeout");
        assert_eq!(
            ExtractionError::Upstream { message: "boom".into() }.reason(),
            "upstream"
        );
    }
}
