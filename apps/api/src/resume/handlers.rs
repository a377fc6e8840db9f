use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::dates::ProcessingClock;
use crate::resume::extractor::{prepare_upload, ResumeContent, UploadedResume};
use crate::resume::models::ResumeRecord;
use crate::resume::pipeline::parse_resume;
use crate::state::AppState;

/// Body shape for the JSON and url-encoded variants.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeTextBody {
    #[serde(default)]
    pub resume_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ParsedResume {
    Record(ResumeRecord),
    Raw(String),
}

#[derive(Debug, Serialize)]
pub struct ParseResumeResponse {
    pub success: bool,
    pub data: ParsedResume,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
}

enum ResumeInput {
    Upload(UploadedResume),
    Text(String),
}

/// POST /api/parse-resume
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ParseResumeResponse>, AppError> {
    let request_id = Uuid::new_v4();
    async move {
        let input = read_input(&state, request).await?;
        let content = match input {
            ResumeInput::Upload(upload) => {
                prepare_upload(upload, &state.config.upload_dir, state.config.pdf_mode).await?
            }
            ResumeInput::Text(text) => {
                info!("Processing resume text ({} chars)", text.len());
                ResumeContent::Text(text)
            }
        };

        let clock = ProcessingClock::now();
        match parse_resume(state.gateway.as_ref(), &state.normalizer, &content, &clock).await {
            Ok(record) => Ok(Json(ParseResumeResponse {
                success: true,
                data: ParsedResume::Record(record),
                raw: None,
            })),
            Err(e) => {
                let raw = e
                    .raw_completion()
                    .filter(|_| state.config.allow_raw_completion)
                    .map(str::to_string);
                match raw {
                    Some(raw) => {
                        warn!("Returning raw completion after parse failure: {e}");
                        Ok(Json(ParseResumeResponse {
                            success: true,
                            data: ParsedResume::Raw(raw),
                            raw: Some(true),
                        }))
                    }
                    None => Err(e.into()),
                }
            }
        }
    }
    .instrument(info_span!("parse_resume", %request_id))
    .await
}

async fn read_input(state: &AppState, request: Request) -> Result<ResumeInput, AppError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<ResumeTextBody>::from_request(request, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        text_input(body.resume_text)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(body) = Form::<ResumeTextBody>::from_request(request, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        text_input(body.resume_text)
    } else {
        Err(AppError::MissingResume)
    }
}

/// A `resume` file wins over a `resumeText` field sent in the same form.
async fn read_multipart(mut multipart: Multipart) -> Result<ResumeInput, AppError> {
    let mut upload = None;
    let mut text = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                upload = Some(UploadedResume { file_name, bytes });
            }
            "resumeText" => {
                text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    match upload {
        Some(upload) => Ok(ResumeInput::Upload(upload)),
        None => text_input(text),
    }
}

fn text_input(text: Option<String>) -> Result<ResumeInput, AppError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(ResumeInput::Text(text)),
        _ => Err(AppError::MissingResume),
    }
}
