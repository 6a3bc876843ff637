//! JSON response envelope shared by every handler
//!
//! The envelope is the client contract: `status` is always present and is either
//! `"success"` or `"error"`.

use serde::{Deserialize, Serialize};

use crate::errors::ErrorCode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// `{status, message?, code?, file_id?, data?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn success() -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            code: None,
            file_id: None,
            data: None,
        }
    }

    pub fn error(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            code: Some(code),
            file_id: None,
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<serde_json::Value>) -> Self {
        self.data = Some(data.into());
        self
    }
}
