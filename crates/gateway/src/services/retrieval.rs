//! CSV download and receipt acknowledgment

use scantron_common::{
    errors::{AppError, Result},
    FileId, UploadStore,
};
use std::sync::Arc;
use tracing::{debug, info};

/// CSV bytes ready to be sent as an attachment
#[derive(Debug)]
pub struct CsvDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct RetrievalService {
    store: Arc<UploadStore>,
}

impl RetrievalService {
    pub fn new(store: Arc<UploadStore>) -> Self {
        Self { store }
    }

    /// Load the CSV indexed under `file_id`
    pub async fn download(&self, file_id: &FileId) -> Result<CsvDownload> {
        let artifact = self
            .store
            .artifact(file_id)
            .await
            .ok_or_else(|| AppError::CsvNotFound {
                file_id: file_id.to_string(),
            })?;

        let exists = tokio::fs::try_exists(&artifact.storage_path)
            .await
            .map_err(AppError::Download)?;
        if !exists {
            debug!(file_id = %file_id, path = %artifact.storage_path.display(), "Indexed CSV missing on disk");
            return Err(AppError::CsvNotFound {
                file_id: file_id.to_string(),
            });
        }

        let bytes = tokio::fs::read(&artifact.storage_path)
            .await
            .map_err(AppError::Download)?;

        debug!(file_id = %file_id, bytes = bytes.len(), "Serving CSV");

        Ok(CsvDownload {
            filename: artifact.filename,
            bytes,
        })
    }

    /// Mark the CSV for `file_id` as received by the client
    pub async fn acknowledge(&self, file_id: &FileId) -> Result<()> {
        if !self.store.acknowledge(file_id).await {
            return Err(AppError::FileIdNotFound {
                file_id: file_id.to_string(),
            });
        }

        info!(file_id = %file_id, "CSV receipt acknowledged");
        Ok(())
    }
}
