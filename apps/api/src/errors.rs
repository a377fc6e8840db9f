use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::resume::extractor::{ExtractError, SUPPORTED_EXTENSIONS};
use crate::resume::pipeline::ParseError;

pub const USAGE_HINT: &str =
    "Send multipart/form-data with a 'resume' file (.pdf or .txt), or a body with a 'resumeText' field";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No resume provided")]
    MissingResume,

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Malformed completion: {0}")]
    MalformedCompletion(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFormat { extension } => AppError::UnsupportedFormat(extension),
            ExtractError::Io(io) => {
                AppError::Internal(anyhow::Error::new(io).context("failed to stage upload"))
            }
            other => AppError::Extraction(other.to_string()),
        }
    }
}

impl From<ParseError> for AppError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Gateway(gateway) => AppError::Llm(gateway.to_string()),
            other => AppError::MalformedCompletion(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra = Map::new();
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingResume => {
                extra.insert("usage".into(), json!(USAGE_HINT));
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "No resume file or resumeText provided".to_string(),
                )
            }
            AppError::UnsupportedFormat(extension) => {
                extra.insert("supportedFormats".into(), json!(SUPPORTED_EXTENSIONS));
                (
                    StatusCode::BAD_REQUEST,
                    "UNSUPPORTED_FORMAT",
                    format!("Unsupported file format: {extension}"),
                )
            }
            AppError::Extraction(msg) => {
                (StatusCode::BAD_REQUEST, "EXTRACTION_FAILED", msg.clone())
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The resume could not be processed by the language model".to_string(),
                )
            }
            AppError::MalformedCompletion(msg) => {
                tracing::error!("Malformed completion: {msg}");
                extra.insert("details".into(), json!(msg));
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_COMPLETION",
                    "The language model returned an unparseable response".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(false));
        body.insert("error".into(), json!({ "code": code, "message": message }));
        body.extend(extra);

        (status, Json(Value::Object(body))).into_response()
    }
}
