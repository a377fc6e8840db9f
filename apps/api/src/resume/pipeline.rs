use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{CompletionRequest, InlineDocument, LlmError, LlmGateway};
use crate::resume::dates::ProcessingClock;
use crate::resume::extractor::ResumeContent;
use crate::resume::models::ResumeRecord;
use crate::resume::normalizer::{NormalizeError, ResumeNormalizer};
use crate::resume::prompts::{ATTACHED_DOCUMENT_NOTE, RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM};
use crate::resume::sanitize::{sanitize_completion, MalformedCompletion};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("LLM gateway failed: {0}")]
    Gateway(#[from] LlmError),

    #[error(transparent)]
    Malformed(#[from] MalformedCompletion),

    #[error("{source}")]
    Schema {
        raw: String,
        #[source]
        source: NormalizeError,
    },
}

impl ParseError {
    /// The untouched completion, when the model answered but the answer was unusable.
    pub fn raw_completion(&self) -> Option<&str> {
        match self {
            Self::Gateway(_) => None,
            Self::Malformed(e) => Some(&e.raw),
            Self::Schema { raw, .. } => Some(raw),
        }
    }
}

fn build_prompt(content: &ResumeContent) -> String {
    let source_block = match content {
        ResumeContent::Text(text) => text.as_str(),
        ResumeContent::Document { .. } => ATTACHED_DOCUMENT_NOTE,
    };
    RESUME_PARSE_PROMPT
        .replace("{no_invention_instruction}", NO_INVENTION_INSTRUCTION)
        .replace("{source_block}", source_block)
}

fn system_prompt() -> String {
    format!("{RESUME_PARSE_SYSTEM} {JSON_ONLY_SYSTEM}")
}

/// Runs one resume through the model and the normalizer.
///
/// Steps:
/// 1. build prompt (text inline, or a note plus the attached document)
/// 2. single gateway call
/// 3. sanitize the completion into JSON
/// 4. normalize against `clock`
pub async fn parse_resume(
    gateway: &dyn LlmGateway,
    normalizer: &ResumeNormalizer,
    content: &ResumeContent,
    clock: &ProcessingClock,
) -> Result<ResumeRecord, ParseError> {
    let prompt = build_prompt(content);
    let system = system_prompt();
    let document = match content {
        ResumeContent::Text(_) => None,
        ResumeContent::Document { media_type, bytes } => Some(InlineDocument {
            media_type: *media_type,
            data: bytes.as_ref(),
        }),
    };

    let completion = gateway
        .complete(CompletionRequest {
            system: &system,
            prompt: &prompt,
            document,
        })
        .await?;
    info!("Received completion ({} chars)", completion.len());

    let value = sanitize_completion(&completion).map_err(|e| {
        warn!("Completion was not valid JSON: {e}");
        e
    })?;

    normalizer
        .normalize(value, clock)
        .map_err(|source| ParseError::Schema {
            raw: completion,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fake::FakeGateway;
    use bytes::Bytes;
    use chrono::NaiveDate;

    fn clock() -> ProcessingClock {
        ProcessingClock::at(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    const COMPLETION: &str = r#"```json
{
  "personalInfo": { "firstName": "Jane", "lastName": "Doe", "email": "jane@example.com" },
  "work": { "skills": ["Rust", "SQL"] },
  "experienceDetails": [
    { "organization": "Acme", "designation": "Engineer", "fromDate": "01/2022", "toDate": "Present" }
  ],
  "educationDetails": [],
  "noticePeriod": ""
}
```"#;

    #[tokio::test]
    async fn test_text_resume_end_to_end() {
        let gateway = FakeGateway::replying(COMPLETION);
        let content = ResumeContent::Text("Jane Doe\nEngineer at Acme".to_string());

        let record = parse_resume(&gateway, &ResumeNormalizer::default(), &content, &clock())
            .await
            .unwrap();

        assert_eq!(record.personal_info.full_name, "Jane Doe");
        assert_eq!(record.work.current_status, "Employed");
        assert_eq!(record.work.experience_in_years, "3Y-6M");
        assert_eq!(record.experience_details[0].to_date, "2025-06");

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("Engineer at Acme"));
        assert!(calls[0].prompt.contains("Do NOT invent"));
        assert!(!calls[0].prompt.contains("{source_block}"));
        assert!(calls[0].system.contains("valid JSON only"));
        assert!(calls[0].document_media_type.is_none());
    }

    #[tokio::test]
    async fn test_inline_document_is_attached() {
        let gateway = FakeGateway::replying("{}");
        let content = ResumeContent::Document {
            media_type: "application/pdf",
            bytes: Bytes::from_static(b"%PDF-1.7"),
        };

        let record = parse_resume(&gateway, &ResumeNormalizer::default(), &content, &clock())
            .await
            .unwrap();
        assert_eq!(record.work.current_status, "Unemployed");

        let calls = gateway.calls();
        assert_eq!(calls[0].document_media_type.as_deref(), Some("application/pdf"));
        assert!(calls[0].prompt.contains(ATTACHED_DOCUMENT_NOTE));
    }

    #[tokio::test]
    async fn test_prose_completion_is_malformed_with_raw_text() {
        let gateway = FakeGateway::replying("I'm sorry, I can't read this resume.");
        let content = ResumeContent::Text("x".to_string());

        let err = parse_resume(&gateway, &ResumeNormalizer::default(), &content, &clock())
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
        assert_eq!(err.raw_completion(), Some("I'm sorry, I can't read this resume."));
    }

    #[tokio::test]
    async fn test_non_object_completion_is_schema_error() {
        let gateway = FakeGateway::replying("[\"not\", \"a\", \"resume\"]");
        let content = ResumeContent::Text("x".to_string());

        let err = parse_resume(&gateway, &ResumeNormalizer::default(), &content, &clock())
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::Schema { .. }));
        assert!(err.raw_completion().is_some());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_surfaced() {
        let gateway = FakeGateway::failing(529, "overloaded");
        let content = ResumeContent::Text("x".to_string());

        let err = parse_resume(&gateway, &ResumeNormalizer::default(), &content, &clock())
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::Gateway(LlmError::Api { status: 529, .. })));
        assert!(err.raw_completion().is_none());
        assert_eq!(gateway.calls().len(), 1);
    }
}
