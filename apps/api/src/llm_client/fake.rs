//! Scripted gateway for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionRequest, LlmError, LlmGateway};

/// What a `FakeGateway` saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
    pub document_media_type: Option<String>,
}

/// Replies with a fixed completion (or failure) and records every request.
pub struct FakeGateway {
    reply: Result<String, (u16, String)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeGateway {
    pub fn replying(completion: impl Into<String>) -> Self {
        Self {
            reply: Ok(completion.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self {
            reply: Err((status, message.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for FakeGateway {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: request.system.to_string(),
            prompt: request.prompt.to_string(),
            document_media_type: request.document.map(|d| d.media_type.to_string()),
        });
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, message)) => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
