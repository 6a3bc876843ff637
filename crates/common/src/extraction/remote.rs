//! HTTP client for an external recognition service

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::{ExtractionError, Extractor};
use crate::models::StudentData;
use crate::response::ResponseStatus;
use crate::FILE_FIELD;

/// Envelope returned by the recognition service
#[derive(Deserialize)]
struct RecognizerResponse {
    status: ResponseStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<StudentData>,
}

/// Posts sheets to a recognition service as multipart `file`
pub struct RemoteExtractor {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteExtractor {
    pub fn new(endpoint: String) -> Result<Self, reqwest::Error> {
        // The intake pipeline owns the overall deadline
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Extractor for RemoteExtractor {
    async fn extract(&self, path: &Path) -> Result<StudentData, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "sheet.pdf".to_string());

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str("application/pdf")?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Upstream {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let body: RecognizerResponse =
            response
                .json()
                .await
                .map_err(|e| ExtractionError::MalformedResponse {
                    message: e.to_string(),
                })?;

        match body.status {
            ResponseStatus::Error => Err(ExtractionError::Upstream {
                message: body.message.unwrap_or_else(|| "unknown error".to_string()),
            }),
            ResponseStatus::Success => {
                let data = body.data.ok_or_else(|| ExtractionError::MalformedResponse {
                    message: "missing data".to_string(),
                })?;
                debug!(students = data.len(), endpoint = %self.endpoint, "Recognizer responded");
                Ok(data)
            }
        }
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Multipart, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Serve `app` on an ephemeral port and return its `/mock_ai` URL
    async fn spawn_recognizer(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/mock_ai")
    }

    fn sheet(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("0a1b_quiz.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%%EOF").unwrap();
        path
    }

    async fn extract_with(app: Router) -> Result<StudentData, ExtractionError> {
        let endpoint = spawn_recognizer(app).await;
        let dir = tempfile::tempdir().unwrap();
        RemoteExtractor::new(endpoint).unwrap().extract(&sheet(dir.path())).await
    }

    #[tokio::test]
    async fn test_success_keeps_answer_order() {
        let uploaded: Arc<Mutex<Option<(String, String)>>> = Arc::default();
        let app = {
            let uploaded = uploaded.clone();
            Router::new().route(
                "/mock_ai",
                post(move |mut multipart: Multipart| async move {
                    let field = multipart.next_field().await.unwrap().unwrap();
                    *uploaded.lock().unwrap() = Some((
                        field.name().unwrap_or_default().to_string(),
                        field.file_name().unwrap_or_default().to_string(),
                    ));
                    Json(json!({
                        "status": "success",
                        "data": {
                            "students": [{
                                "studentID": "S1",
                                "answers": { "Q3": "C", "Q1": ["A", "B"], "Q2": null }
                            }],
                            "file_id": null
                        }
                    }))
                }),
            )
        };

        let data = extract_with(app).await.unwrap();
        assert_eq!(data.len(), 1);
        let answers = data.students[0].answers.as_ref().unwrap();
        let keys: Vec<&str> = answers.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Q3", "Q1", "Q2"]);
        assert_eq!(answers["Q1"], json!(["A", "B"]));

        let (field, filename) = uploaded.lock().unwrap().take().unwrap();
        assert_eq!(field, FILE_FIELD);
        assert_eq!(filename, "0a1b_quiz.pdf");
    }

    #[tokio::test]
    async fn test_error_envelope_is_upstream() {
        let app = Router::new().route(
            "/mock_ai",
            post(|| async {
                Json(json!({ "status": "error", "message": "Only PDF files are allowed" }))
            }),
        );

        match extract_with(app).await {
            Err(ExtractionError::Upstream { message }) => {
                assert_eq!(message, "Only PDF files are allowed")
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_status_is_upstream() {
        let app = Router::new().route(
            "/mock_ai",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "recognizer crashed") }),
        );

        match extract_with(app).await {
            Err(ExtractionError::Upstream { message }) => {
                assert!(message.contains("500"), "{message}");
                assert!(message.contains("recognizer crashed"), "{message}");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = Router::new().route("/mock_ai", post(|| async { "not json" }));
        assert!(matches!(
            extract_with(app).await,
            Err(ExtractionError::MalformedResponse { .. })
        ));

        let app = Router::new().route(
            "/mock_ai",
            post(|| async { Json(json!({ "status": "success" })) }),
        );
        assert!(matches!(
            extract_with(app).await,
            Err(ExtractionError::MalformedResponse { .. })
        ));

        let app = Router::new().route(
            "/mock_ai",
            post(|| async {
                Json(json!({ "status": "success", "data": { "students": "S1" } }))
            }),
        );
        assert!(matches!(
            extract_with(app).await,
            Err(ExtractionError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_parses_success_envelope() {
        let body: RecognizerResponse = serde_json::from_str(
            r#"{"status":"success","data":{"students":[{"studentID":"AB12CD34","answers":{"Q1":"Answer_A"}}],"file_id":null}}"#,
        )
        .unwrap();
        assert_eq!(body.status, ResponseStatus::Success);
        assert_eq!(body.data.unwrap().len(), 1);
    }

    #[test]
    fn test_parses_error_envelope() {
        let body: RecognizerResponse =
            serde_json::from_str(r#"{"status":"error","message":"Only PDF files are allowed"}"#)
                .unwrap();
        assert_eq!(body.status, ResponseStatus::Error);
        assert!(body.data.is_none());
        assert_eq!(body.message.as_deref(), Some("Only PDF files are allowed"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let extractor = RemoteExtractor::new("http://127.0.0.1:9/mock_ai".to_string()).unwrap();
        let result = extractor.extract(Path::new("/nonexistent/sheet.pdf")).await;
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }
}
