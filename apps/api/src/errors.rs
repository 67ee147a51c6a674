use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use review_client::models::{ApiErrorPayload, ErrorEnvelope};
use serde_json::{json, Value};
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`;
/// every variant renders as `{ "error": { code, message, details } }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("A PDF file must be provided in the 'file' field.")]
    MissingFile,

    #[error("Only PDF files are supported.")]
    InvalidFileType { content_type: Option<String> },

    #[error("File exceeds the 20MB size limit.")]
    FileTooLarge { size: Option<usize> },

    #[error("Malformed multipart body: {0}")]
    InvalidMultipart(String),

    #[error("Failed to parse the PDF; the file may be damaged.")]
    PdfParseFailed(String),

    #[error("No text could be extracted from the PDF.")]
    PdfEmptyText,

    #[error("The review model call failed, please try again later.")]
    LlmCallFailed(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<Value>) {
        match self {
            AppError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE", None),
            AppError::InvalidFileType { content_type } => (
                StatusCode::BAD_REQUEST,
                "INVALID_FILE_TYPE",
                Some(json!({ "content_type": content_type })),
            ),
            AppError::FileTooLarge { size } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "FILE_TOO_LARGE",
                Some(json!({ "size": size, "limit_mb": 20 })),
            ),
            AppError::InvalidMultipart(_) => (StatusCode::BAD_REQUEST, "INVALID_MULTIPART", None),
            AppError::PdfParseFailed(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PDF_PARSE_FAILED",
                Some(Value::String(reason.clone())),
            ),
            AppError::PdfEmptyText => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PDF_PARSE_EMPTY_TEXT",
                None,
            ),
            AppError::LlmCallFailed(e) => (
                StatusCode::BAD_GATEWAY,
                "LLM_CALL_FAILED",
                Some(Value::String(e.to_string())),
            ),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, details) = self.parts();

        match &self {
            AppError::LlmCallFailed(e) => tracing::error!("LLM error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::PdfParseFailed(reason) => tracing::warn!("PDF parse failed: {reason}"),
            other => tracing::debug!("Rejected upload: {other}"),
        }

        let message = match &self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        let body = Json(ErrorEnvelope {
            error: ApiErrorPayload {
                code: code.to_string(),
                message,
                details,
            },
        });

        (status, body).into_response()
    }
}
