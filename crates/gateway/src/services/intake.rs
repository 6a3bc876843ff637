//! PDF intake and conversion
//!
//! Handles the upload workflow:
//! 1. Persist the validated PDF in the upload directory
//! 2. Register the upload under a fresh file id
//! 3. Run extraction (bounded by a timeout)
//! 4. Convert to CSV, persist it, and index the artifact
//! 5. Delete the PDF, whatever happened in 3-4
//!
//! Extraction failures never fail the request: they are logged and reported
//! as an empty CSV filename.

use scantron_common::{
    csv::students_to_csv,
    errors::Result,
    metrics,
    upload::{is_pdf_filename, sanitize_filename, UploadedFile},
    CsvArtifact, ExtractionError, Extractor, FileId, StudentData, UploadStore,
    UploadedFileRecord,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Result of a completed intake
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub file_id: FileId,
    /// Generated CSV name, empty when no CSV was produced
    pub csv_filename: String,
}

impl IntakeOutcome {
    pub fn produced_csv(&self) -> bool {
        !self.csv_filename.is_empty()
    }
}

pub struct IntakeService {
    store: Arc<UploadStore>,
    extractor: Arc<dyn Extractor>,
    upload_dir: PathBuf,
    extraction_timeout: Duration,
}

impl IntakeService {
    pub fn new(
        store: Arc<UploadStore>,
        extractor: Arc<dyn Extractor>,
        upload_dir: PathBuf,
        extraction_timeout: Duration,
    ) -> Self {
        Self {
            store,
            extractor,
            upload_dir,
            extraction_timeout,
        }
    }

    /// Accept a validated PDF upload and run it through the pipeline.
    ///
    /// Only failing to save the PDF is an error; everything after that
    /// degrades to an outcome without a CSV.
    #[instrument(skip(self, file), fields(filename = %file.filename, bytes = file.data.len()))]
    pub async fn accept(&self, file: &UploadedFile) -> Result<IntakeOutcome> {
        let filename = storage_filename(&file.filename);
        let file_id = FileId::generate();

        // Prefix with the id so concurrent uploads of the same name never share a path
        let pdf_path = self.upload_dir.join(format!("{}_{}", file_id, filename));
        tokio::fs::write(&pdf_path, &file.data).await?;

        self.store
            .register_upload(UploadedFileRecord::new(
                file_id.clone(),
                filename,
                pdf_path.clone(),
            ))
            .await;

        let csv_filename = self.process(&pdf_path, &file_id).await;

        if let Err(e) = tokio::fs::remove_file(&pdf_path).await {
            warn!(file_id = %file_id, path = %pdf_path.display(), error = %e, "Failed to delete uploaded PDF");
        }

        info!(
            file_id = %file_id,
            csv = %csv_filename,
            "Upload processed"
        );

        Ok(IntakeOutcome {
            file_id,
            csv_filename,
        })
    }

    /// Extract, convert, and index. Returns the CSV filename or an empty string.
    async fn process(&self, pdf_path: &Path, file_id: &FileId) -> String {
        let data = match self.extract(pdf_path).await {
            Ok(data) => data,
            Err(e) => {
                error!(file_id = %file_id, error = %e, "Error processing PDF");
                return String::new();
            }
        };

        let csv = students_to_csv(&data);
        if csv.is_empty() {
            warn!(file_id = %file_id, students = data.len(), "Extraction produced no CSV rows");
        }

        let csv_filename = file_id.csv_filename();
        let csv_path = self.upload_dir.join(&csv_filename);

        if let Err(e) = tokio::fs::write(&csv_path, csv.as_bytes()).await {
            error!(file_id = %file_id, path = %csv_path.display(), error = %e, "Failed to write CSV");
            return String::new();
        }

        if !self
            .store
            .complete(file_id, CsvArtifact::new(csv_filename.clone(), csv_path))
            .await
        {
            error!(file_id = %file_id, "Upload vanished before its CSV was indexed");
            return String::new();
        }

        if !csv.is_empty() {
            metrics::record_csv_rows(data.len());
        }
        debug!(file_id = %file_id, students = data.len(), "CSV artifact indexed");

        csv_filename
    }

    /// Run the extractor under the configured deadline
    async fn extract(&self, pdf_path: &Path) -> std::result::Result<StudentData, ExtractionError> {
        let start = Instant::now();

        let result = tokio::time::timeout(self.extraction_timeout, self.extractor.extract(pdf_path))
            .await
            .unwrap_or_else(|_| {
                Err(ExtractionError::Timeout {
                    timeout_secs: self.extraction_timeout.as_secs(),
                })
            });

        metrics::record_extraction(
            start.elapsed().as_secs_f64(),
            self.extractor.name(),
            result.as_ref().err().map(ExtractionError::reason),
        );

        result
    }
}

/// Sanitized name for the saved sheet, always ending in `.pdf`.
///
/// Sanitizing can strip the extension (`ü.pdf` becomes `pdf`), and the
/// recognizer validates the name it is sent.
fn storage_filename(client_filename: &str) -> String {
    let sanitized = sanitize_filename(client_filename);
    if is_pdf_filename(&sanitized) {
        sanitized
    } else {
        format!("{}.pdf", sanitized)
    }
}
