use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    Internal,
    Unexpected,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            400 | 422 => ErrorCode::Validation,
            500..=599 => ErrorCode::Internal,
            _ => ErrorCode::Unexpected,
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: None,
            message: message.into(),
        }
    }

    /// Builds the error for a non-success response. The server answers with
    /// a plain-text status line such as `Forbidden`; when the body is empty
    /// the canonical reason phrase stands in.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let body = body.trim();
        let message = if !body.is_empty() {
            body.to_string()
        } else {
            reason
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {status}"))
        };
        Self {
            code: ErrorCode::from_status(status),
            status: Some(status),
            message,
        }
    }
}
