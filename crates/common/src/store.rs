//! In-memory tracking of uploads and generated CSV artifacts
//!
//! Both tables live behind a single lock so that an artifact and the
//! `processed` flag of its upload always change together. State is process
//! lifetime only; nothing is expired or persisted.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

/// Number of random bytes behind a file id
const FILE_ID_BYTES: usize = 16;

/// Opaque upload handle: 16 OS-random bytes as lower-case hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; FILE_ID_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the CSV generated for this upload
    pub fn csv_filename(&self) -> String {
        format!("output_{}.csv", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One accepted PDF upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFileRecord {
    pub file_id: FileId,
    pub original_filename: String,
    /// Transient PDF location; stale once processing has finished
    pub storage_path: PathBuf,
    pub processed: bool,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
}

impl UploadedFileRecord {
    pub fn new(file_id: FileId, original_filename: String, storage_path: PathBuf) -> Self {
        Self {
            file_id,
            original_filename,
            storage_path,
            processed: false,
            acknowledged: false,
            created_at: Utc::now(),
        }
    }
}

/// CSV generated from a processed upload
#[derive(Debug, Clone, Serialize)]
pub struct CsvArtifact {
    pub filename: String,
    pub storage_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl CsvArtifact {
    pub fn new(filename: String, storage_path: PathBuf) -> Self {
        Self {
            filename,
            storage_path,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub uploads: usize,
    pub artifacts: usize,
}

#[derive(Default)]
struct Tables {
    uploads: HashMap<FileId, UploadedFileRecord>,
    artifacts: HashMap<FileId, CsvArtifact>,
}

/// Upload and artifact tables keyed by file id
///
/// ```
/// use scantron_common::{CsvArtifact, FileId, UploadStore, UploadedFileRecord};
/// use std::path::PathBuf;
///
/// # tokio_test::block_on(async {
/// let store = UploadStore::new();
/// let id = FileId::generate();
/// store
///     .register_upload(UploadedFileRecord::new(
///         id.clone(),
///         "quiz.pdf".into(),
///         PathBuf::from("quiz.pdf"),
///     ))
///     .await;
///
/// let artifact = CsvArtifact::new(id.csv_filename(), PathBuf::from(id.csv_filename()));
/// assert!(store.complete(&id, artifact).await);
/// assert!(store.upload(&id).await.unwrap().processed);
/// # });
/// ```
#[derive(Default)]
pub struct UploadStore {
    tables: RwLock<Tables>,
}

impl UploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly accepted upload
    pub async fn register_upload(&self, record: UploadedFileRecord) {
        let mut tables = self.tables.write().await;
        debug!(file_id = %record.file_id, filename = %record.original_filename, "Upload registered");
        tables.uploads.insert(record.file_id.clone(), record);
    }

    /// Index the artifact and mark its upload processed.
    ///
    /// Returns `false` (and indexes nothing) when the upload is unknown.
    pub async fn complete(&self, file_id: &FileId, artifact: CsvArtifact) -> bool {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        match tables.uploads.get_mut(file_id) {
            Some(record) => {
                record.processed = true;
                tables.artifacts.insert(file_id.clone(), artifact);
                true
            }
            None => false,
        }
    }

    pub async fn upload(&self, file_id: &FileId) -> Option<UploadedFileRecord> {
        self.tables.read().await.uploads.get(file_id).cloned()
    }

    pub async fn artifact(&self, file_id: &FileId) -> Option<CsvArtifact> {
        self.tables.read().await.artifacts.get(file_id).cloned()
    }

    /// Record client receipt of the CSV. Idempotent; `false` for unknown ids.
    pub async fn acknowledge(&self, file_id: &FileId) -> bool {
        let mut tables = self.tables.write().await;
        match tables.uploads.get_mut(file_id) {
            Some(record) => {
                record.acknowledged = true;
                true
            }
            None => false,
        }
    }

    pub async fn counts(&self) -> StoreCounts {
        let tables = self.tables.read().await;
        StoreCounts {
            uploads: tables.uploads.len(),
            artifacts: tables.artifacts.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn record(file_id: &FileId) -> UploadedFileRecord {
        UploadedFileRecord::new(
            file_id.clone(),
            "sheet.pdf".to_string(),
            PathBuf::from("/tmp/sheet.pdf"),
        )
    }

    #[test]
    fn test_file_id_format() {
        let id = FileId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(id.csv_filename(), format!("output_{}.csv", id));
    }

    #[test]
    fn test_file_ids_are_unique() {
        let ids: HashSet<FileId> = (0..1000).map(|_| FileId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[tokio::test]
    async fn test_new_upload_is_unprocessed() {
        let store = UploadStore::new();
        let id = FileId::generate();
        store.register_upload(record(&id)).await;

        let upload = store.upload(&id).await.unwrap();
        assert!(!upload.processed);
        assert!(!upload.acknowledged);
        assert!(store.artifact(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_complete_indexes_artifact_and_marks_processed() {
        let store = UploadStore::new();
        let id = FileId::generate();
        store.register_upload(record(&id)).await;

        let artifact = CsvArtifact::new(id.csv_filename(), PathBuf::from("/tmp/out.csv"));
        assert!(store.complete(&id, artifact).await);

        assert!(store.upload(&id).await.unwrap().processed);
        assert_eq!(store.artifact(&id).await.unwrap().filename, id.csv_filename());
        assert_eq!(store.counts().await, StoreCounts { uploads: 1, artifacts: 1 });
    }

    #[tokio::test]
    async fn test_complete_unknown_upload_indexes_nothing() {
        let store = UploadStore::new();
        let id = FileId::generate();
        let artifact = CsvArtifact::new(id.csv_filename(), PathBuf::from("/tmp/out.csv"));

        assert!(!store.complete(&id, artifact).await);
        assert!(store.artifact(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_acknowledge_is_idempotent() {
        let store = UploadStore::new();
        let id = FileId::generate();
        store.register_upload(record(&id)).await;

        assert!(store.acknowledge(&id).await);
        assert!(store.acknowledge(&id).await);
        assert!(store.upload(&id).await.unwrap().acknowledged);
    }

    #[tokio::test]
    async fn test_acknowledge_unknown_id() {
        let store = UploadStore::new();
        assert!(!store.acknowledge(&FileId::from("missing".to_string())).await);
    }
}
