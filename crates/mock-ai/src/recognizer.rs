//! Fabricated answer-sheet recognition
//!
//! Each request is saved to the scratch directory just long enough to count
//! its pages, then one student is fabricated per page.

use scantron_common::{
    config::MockAiConfig,
    errors::Result,
    extraction::{count_pages, generate_students},
    upload::{sanitize_filename, UploadedFile},
    StudentRecord,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Payload returned under `data` and pushed to the forward URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recognition {
    pub students: Vec<StudentRecord>,
    pub file_id: Option<String>,
}

pub struct MockRecognizer {
    client: reqwest::Client,
    upload_dir: PathBuf,
    questions: usize,
    forward_url: Option<String>,
}

impl MockRecognizer {
    pub fn new(
        config: &MockAiConfig,
        forward_timeout: Duration,
    ) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(forward_timeout).build()?;

        Ok(Self {
            client,
            upload_dir: config.upload_dir.clone(),
            questions: config.questions_per_sheet,
            forward_url: config.forward_url.clone(),
        })
    }

    /// Fabricate one student per page of `file`.
    ///
    /// Only failing to save the upload is an error. An unreadable PDF yields no
    /// students.
    pub async fn recognize(
        &self,
        file: &UploadedFile,
        file_id: Option<String>,
    ) -> Result<Recognition> {
        let path = self.upload_dir.join(sanitize_filename(&file.filename));
        tokio::fs::write(&path, &file.data).await?;

        let counted = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || count_pages(&path)).await
        };

        let pages = match counted {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                warn!(error = %e, "Unreadable PDF, returning no students");
                0
            }
            Err(e) => {
                warn!(error = %e, "Page count task failed, returning no students");
                0
            }
        };

        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "Failed to delete uploaded PDF");
        }

        let students = generate_students(pages, self.questions).students;
        info!(pages, file_id = ?file_id, "Fabricated student answers");

        Ok(Recognition { students, file_id })
    }

    /// Push a result to the configured forward URL. Failures are only logged.
    pub async fn forward(&self, recognition: &Recognition) {
        let Some(url) = &self.forward_url else {
            return;
        };

        match self.client.post(url).json(recognition).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(url = %url, "Forwarded recognition result");
            }
            Ok(response) => {
                warn!(url = %url, status = %response.status(), "Forward target rejected result");
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to forward recognition result");
            }
        }
    }
}
