//! Synthetic recognizer: one fabricated student per PDF page

use async_trait::async_trait;
use rand::distributions::Uniform;
use rand::Rng;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use super::{ExtractionError, Extractor};
use crate::models::{StudentData, StudentRecord};

/// Characters a fabricated student id is drawn from
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a fabricated student id
const ID_LENGTH: usize = 8;

/// Answers cycle through A..E
const CHOICES: u8 = 5;

/// Count the pages of the PDF at `path`
pub fn count_pages(path: &Path) -> Result<usize, ExtractionError> {
    let doc = lopdf::Document::load(path).map_err(|e| ExtractionError::PdfParse {
        path: path.display().to_string(),
        message: format!("Failed to load PDF: {}", e),
    })?;

    let pages = doc.get_pages().len();
    debug!(page_count = pages, path = %path.display(), "Counted PDF pages");
    Ok(pages)
}

/// Fabricate one student: a random id and `Q1..Qn` answered `Answer_A..Answer_E` in turn
pub fn generate_student<R: Rng + ?Sized>(rng: &mut R, questions: usize) -> StudentRecord {
    let index = Uniform::from(0..ID_ALPHABET.len());
    let student_id: String = (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.sample(index)] as char)
        .collect();

    let answers: Map<String, Value> = (0..questions)
        .map(|k| {
            let choice = (b'A' + (k % CHOICES as usize) as u8) as char;
            (format!("Q{}", k + 1), Value::String(format!("Answer_{}", choice)))
        })
        .collect();

    StudentRecord::new(student_id, answers)
}

/// Fabricate `count` students
pub fn generate_students(count: usize, questions: usize) -> StudentData {
    let mut rng = rand::thread_rng();
    StudentData::new(
        (0..count)
            .map(|_| generate_student(&mut rng, questions))
            .collect(),
    )
}

/// In-process stand-in for the recognition service
pub struct SyntheticExtractor {
    questions: usize,
}

impl SyntheticExtractor {
    pub fn new(questions: usize) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl Extractor for SyntheticExtractor {
    async fn extract(&self, path: &Path) -> Result<StudentData, ExtractionError> {
        let path = path.to_path_buf();
        // lopdf parsing is blocking
        let pages = tokio::task::spawn_blocking(move || count_pages(&path))
            .await
            .map_err(|e| ExtractionError::Io(std::io::Error::other(e)))??;

        Ok(generate_students(pages, self.questions))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object};

    fn write_pdf(path: &Path, pages: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                })
                .into()
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_generated_student_shape() {
        let student = generate_student(&mut rand::thread_rng(), 20);

        let id = student.student_id.as_ref().and_then(Value::as_str).unwrap();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));

        let answers = student.answers.unwrap();
        let keys: Vec<&str> = answers.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 20);
        assert_eq!(keys[0], "Q1");
        assert_eq!(keys[19], "Q20");
        assert_eq!(answers["Q1"], "Answer_A");
        assert_eq!(answers["Q5"], "Answer_E");
        assert_eq!(answers["Q6"], "Answer_A");
        assert_eq!(answers["Q20"], "Answer_E");
    }

    #[test]
    fn test_generate_students_count() {
        assert_eq!(generate_students(3, 4).len(), 3);
        assert!(generate_students(0, 4).is_empty());
    }

    #[test]
    fn test_count_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.pdf");
        write_pdf(&path, 3);
        assert_eq!(count_pages(&path).unwrap(), 3);
    }

    #[test]
    fn test_count_pages_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();
        assert!(matches!(count_pages(&path), Err(ExtractionError::PdfParse { .. })));
    }

    #[tokio::test]
    async fn test_extract_one_student_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.pdf");
        write_pdf(&path, 2);

        let data = SyntheticExtractor::new(5).extract(&path).await.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.students[1].answers.as_ref().unwrap().len(), 5);
    }
}
