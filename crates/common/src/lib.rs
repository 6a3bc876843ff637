//! Scantron Common Library
//!
//! Shared code for the scantron services including:
//! - Configuration management
//! - Error types and the JSON response envelope
//! - Student answer data model and the JSON to CSV transform
//! - In-memory upload/artifact tracking store
//! - Extraction capability (remote recognizer or synthetic stand-in)
//! - Upload helpers (file ids, filename sanitization)
//! - Metrics descriptors
//! - CORS policy construction

pub mod config;
pub mod cors;
pub mod csv;
pub mod errors;
pub mod extraction;
pub mod metrics;
pub mod models;
pub mod response;
pub mod store;
pub mod upload;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use extraction::{Extractor, ExtractionError};
pub use models::{StudentData, StudentRecord};
pub use response::ApiResponse;
pub use store::{CsvArtifact, FileId, UploadStore, UploadedFileRecord};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Multipart field carrying the uploaded sheet
pub const FILE_FIELD: &str = "file";
