//! LLM Gateway: the single point of entry for model calls in the resume parser.
//!
//! Handlers and the pipeline only see the `LlmGateway` trait; `AppState` carries an
//! `Arc<dyn LlmGateway>` built at startup, and tests substitute a fake.
//!
//! Model: claude-sonnet-4-5

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[cfg(test)]
pub mod fake;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all resume extraction calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Raw document bytes sent alongside the prompt.
#[derive(Debug, Clone, Copy)]
pub struct InlineDocument<'a> {
    pub media_type: &'a str,
    pub data: &'a [u8],
}

/// A single completion request: system instructions, user prompt, optional document.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub document: Option<InlineDocument<'a>>,
}

/// Sends a prompt to a generative-text service and returns the raw completion text.
/// No guarantee is made that the text is well-formed JSON.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Document { source: DocumentSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct DocumentSource<'a> {
    #[serde(rename = "type")]
    encoding: &'a str,
    media_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Anthropic Messages API implementation of `LlmGateway`.
/// One attempt per call: failures surface to the caller unretried.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {e}");
                Client::new()
            });
        Self { client, api_key }
    }
}

fn build_request<'a>(request: &CompletionRequest<'a>) -> AnthropicRequest<'a> {
    let mut content = Vec::with_capacity(2);
    if let Some(document) = request.document {
        content.push(ContentPart::Document {
            source: DocumentSource {
                encoding: "base64",
                media_type: document.media_type,
                data: base64::engine::general_purpose::STANDARD.encode(document.data),
            },
        });
    }
    content.push(ContentPart::Text {
        text: request.prompt,
    });

    AnthropicRequest {
        model: MODEL,
        max_tokens: MAX_TOKENS,
        system: request.system,
        messages: vec![AnthropicMessage {
            role: "user",
            content,
        }],
    }
}

#[async_trait]
impl LlmGateway for LlmClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        let request_body = build_request(&request);

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("LLM API returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;
        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        llm_response
            .text()
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_only_request_shape() {
        let request = CompletionRequest {
            system: "sys",
            prompt: "parse this",
            document: None,
        };
        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["system"], "sys");
        assert_eq!(
            body["messages"][0]["content"],
            json!([{ "type": "text", "text": "parse this" }])
        );
    }

    #[test]
    fn test_document_precedes_prompt_and_is_base64() {
        let request = CompletionRequest {
            system: "sys",
            prompt: "parse this",
            document: Some(InlineDocument {
                media_type: "application/pdf",
                data: b"%PDF",
            }),
        };
        let body = serde_json::to_value(build_request(&request)).unwrap();
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "document");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "application/pdf");
        assert_eq!(content[0]["source"]["data"], "JVBERg==");
        assert_eq!(content[1]["type"], "text");
    }

    #[test]
    fn test_response_text_picks_first_text_block() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [
                { "type": "thinking" },
                { "type": "text", "text": "{\"a\":1}" }
            ],
            "usage": { "input_tokens": 10, "output_tokens": 4 }
        }))
        .unwrap();
        assert_eq!(response.text(), Some("{\"a\":1}"));
    }
}
