//! Multipart intake helpers shared by the gateway and the mock recognizer

use axum::extract::Multipart;
use std::collections::HashMap;

use crate::errors::{AppError, Result};
use crate::FILE_FIELD;

/// Name used when sanitization leaves nothing of the client filename
const FALLBACK_FILENAME: &str = "upload.pdf";

/// A file part with its client-supplied name
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parsed multipart form: the `file` part plus any text fields
#[derive(Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Check the `file` part is present, named, and a PDF
    pub fn pdf(&self) -> Result<&UploadedFile> {
        let file = self.file.as_ref().ok_or(AppError::NoFilePart)?;

        if file.filename.is_empty() {
            return Err(AppError::NoSelectedFile);
        }

        if !is_pdf_filename(&file.filename) {
            return Err(AppError::UnsupportedFileType {
                filename: file.filename.clone(),
            });
        }

        Ok(file)
    }
}

/// Read every part of a multipart body.
///
/// Only a part named `file` that carries a filename counts as the upload; a
/// plain text part with that name is treated like any other field.
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidFormat {
            message: format!("Failed to read form field: {}", e),
        })?
    {
        let name = field.name().unwrap_or("").to_string();

        match field.file_name().map(str::to_string) {
            Some(filename) if name == FILE_FIELD => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidFormat {
                        message: format!("Failed to read file data: {}", e),
                    })?
                    .to_vec();

                form.file = Some(UploadedFile { filename, data });
            }
            // Unrelated file parts are drained by the next `next_field` call
            Some(_) => {}
            None => {
                let value = field.text().await.map_err(|e| AppError::InvalidFormat {
                    message: format!("Failed to read {}: {}", name, e),
                })?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Case-insensitive `.pdf` extension check on the raw client filename
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".pdf")
}

/// Reduce a client filename to a safe single path component.
///
/// Path separators become spaces, whitespace runs become `_`, anything outside
/// `[A-Za-z0-9._-]` is dropped, and leading/trailing `.`/`_` are trimmed.
pub fn sanitize_filename(filename: &str) -> String {
    let separated: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = separated.split_whitespace().collect::<Vec<_>>().join("_");

    let sanitized: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = sanitized.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(filename: &str) -> UploadForm {
        UploadForm {
            file: Some(UploadedFile {
                filename: filename.to_string(),
                data: b"%PDF-1.4".to_vec(),
            }),
            fields: HashMap::new(),
        }
    }

    #[test]
    fn test_pdf_extension_is_case_insensitive() {
        assert!(is_pdf_filename("sheet.pdf"));
        assert!(is_pdf_filename("SHEET.PDF"));
        assert!(is_pdf_filename("Sheet.Pdf"));
        assert!(!is_pdf_filename("notes.txt"));
        assert!(!is_pdf_filename("sheet.pdf.txt"));
        assert!(!is_pdf_filename("pdf"));
    }

    #[test]
    fn test_sanitize_strips_paths() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\scan.pdf"), "C_Users_me_scan.pdf");
        assert_eq!(sanitize_filename("/abs/path/sheet.pdf"), "abs_path_sheet.pdf");
    }

    #[test]
    fn test_sanitize_replaces_whitespace_and_drops_unsafe() {
        assert_eq!(sanitize_filename("My Exam  (v2).pdf"), "My_Exam_v2.pdf");
        assert_eq!(sanitize_filename("ünïcode.pdf"), "ncode.pdf");
        assert_eq!(sanitize_filename("my-file_1.pdf"), "my-file_1.pdf");
    }

    #[test]
    fn test_sanitize_falls_back_when_nothing_remains() {
        assert_eq!(sanitize_filename("..."), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("%%%"), FALLBACK_FILENAME);
    }

    #[test]
    fn test_form_validation_order() {
        assert!(matches!(UploadForm::default().pdf(), Err(AppError::NoFilePart)));
        assert!(matches!(form_with("").pdf(), Err(AppError::NoSelectedFile)));
        assert!(matches!(
            form_with("notes.txt").pdf(),
            Err(AppError::UnsupportedFileType { .. })
        ));
        assert_eq!(form_with("Exam.PDF").pdf().unwrap().filename, "Exam.PDF");
    }
}
