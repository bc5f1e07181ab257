//! Vision provider abstractions and implementations.
//!
//! The relay only needs one capability from an upstream model: answer a text
//! prompt about an inline image. The trait keeps the OpenRouter client and
//! the scripted test double interchangeable.

pub mod mock;
pub mod openrouter;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// HTTP status reported by the upstream, if it got far enough to send one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::RateLimited => Some(429),
            ProviderError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ApiError { .. } => "api_error",
            ProviderError::NetworkError(_) => "network",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Base64 image sent inline with the prompt.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Generation parameters for a completion.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// One multimodal user turn: a text prompt plus an image.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub prompt: String,
    pub image: InlineImage,
    pub params: GenerationParams,
}

/// The first choice of a completion.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// Assistant text. `None` when the message carried no content.
    pub text: Option<String>,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: Option<String>,
}

#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Whether credentials are present. Checked before every analysis.
    fn is_configured(&self) -> bool;

    /// Run one completion against `model`.
    ///
    /// Implementations return [`ProviderError::InvalidResponse`] when the
    /// upstream answers without a first choice/message.
    async fn complete(
        &self,
        model: &str,
        request: &VisionRequest,
    ) -> Result<Completion, ProviderError>;
}
