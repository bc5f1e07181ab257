//! Scripted provider for tests and offline runs.

use super::{Completion, ProviderError, VisionProvider, VisionRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// What the mock answers for a given model.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A completion whose first choice carries this text.
    Text(String),
    /// A completion whose message has no content.
    NoContent,
    /// A completion with no choices at all.
    NoChoices,
    /// An HTTP failure with this status.
    Status(u16),
    /// The connection failed before any status.
    Network,
}

impl MockReply {
    fn into_result(self) -> Result<Completion, ProviderError> {
        match self {
            MockReply::Text(text) => Ok(Completion {
                text: Some(text),
                input_tokens: 1000,
                output_tokens: 400,
                finish_reason: Some("stop".to_string()),
            }),
            MockReply::NoContent => Ok(Completion {
                text: None,
                ..Completion::default()
            }),
            MockReply::NoChoices => Err(ProviderError::InvalidResponse(
                "Response has no choices".to_string(),
            )),
            MockReply::Status(429) => Err(ProviderError::RateLimited),
            MockReply::Status(status) => Err(ProviderError::ApiError {
                status,
                message: format!("mock status {}", status),
            }),
            MockReply::Network => Err(ProviderError::NetworkError(
                "mock connection reset".to_string(),
            )),
        }
    }
}

/// Mock vision provider that answers per model and records every call.
pub struct MockVisionProvider {
    configured: bool,
    default_reply: MockReply,
    replies: HashMap<String, MockReply>,
    calls: Mutex<Vec<String>>,
}

impl MockVisionProvider {
    /// Every model answers with `reply`.
    pub fn new(reply: MockReply) -> Self {
        Self {
            configured: true,
            default_reply: reply,
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Override the reply for one model.
    pub fn with_reply(mut self, model: impl Into<String>, reply: MockReply) -> Self {
        self.replies.insert(model.into(), reply);
        self
    }

    /// Behave as if no credentials were configured.
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Models called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(
        &self,
        model: &str,
        _request: &VisionRequest,
    ) -> Result<Completion, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(model.to_string());
        }

        if !self.configured {
            return Err(ProviderError::NotConfigured(
                "Mock provider not configured".to_string(),
            ));
        }

        self.replies
            .get(model)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone())
            .into_result()
    }
}
