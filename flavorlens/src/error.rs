//! Relay error classes and their HTTP mapping.

use crate::services::providers::ProviderError;
use service_core::error::AppError;
use thiserror::Error;

pub const MSG_BUSY: &str = "AI service is currently busy. Please try again in a few moments.";
pub const MSG_BAD_IMAGE: &str = "Invalid image format. Please try a different image.";
pub const MSG_AUTH_FAILED: &str = "API authentication failed. Please check your API key.";
pub const MSG_GENERIC: &str = "Unable to analyze image at the moment. Please try again later.";
pub const MSG_TOO_LARGE: &str = "Image is too large. Please choose a smaller image.";

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("No image provided")]
    MissingImage,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Request body too large: {0}")]
    BodyTooLarge(String),

    #[error("OpenRouter API key not configured")]
    NotConfigured,

    #[error("Upstream failure: {0}")]
    Upstream(ProviderError),

    #[error("Invalid response from AI")]
    InvalidResponse,

    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("Failed to parse AI response as JSON")]
    MalformedOutput,

    #[error("{message}")]
    NoFood { message: String },

    #[error("No valid recipes found in AI response")]
    NoValidRecipes,
}

impl From<ProviderError> for AnalyzeError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(_) => AnalyzeError::NotConfigured,
            ProviderError::InvalidResponse(_) => AnalyzeError::InvalidResponse,
            other => AnalyzeError::Upstream(other),
        }
    }
}

impl AnalyzeError {
    /// Outcome label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::MissingImage => "missing_image",
            AnalyzeError::InvalidBody(_) => "invalid_body",
            AnalyzeError::BodyTooLarge(_) => "body_too_large",
            AnalyzeError::NotConfigured => "not_configured",
            AnalyzeError::Upstream(ProviderError::RateLimited) => "rate_limited",
            AnalyzeError::Upstream(_) => "upstream_error",
            AnalyzeError::InvalidResponse => "invalid_response",
            AnalyzeError::EmptyResponse => "empty_response",
            AnalyzeError::MalformedOutput => "malformed_output",
            AnalyzeError::NoFood { .. } => "no_food",
            AnalyzeError::NoValidRecipes => "no_valid_recipes",
        }
    }
}

impl From<AnalyzeError> for AppError {
    fn from(err: AnalyzeError) -> Self {
        match err {
            AnalyzeError::MissingImage => AppError::BadRequest(err.to_string()),
            AnalyzeError::InvalidBody(detail) => {
                tracing::debug!(detail = %detail, "Rejected analyze request body");
                AppError::BadRequest("Invalid request body".to_string())
            }
            AnalyzeError::BodyTooLarge(detail) => {
                tracing::debug!(detail = %detail, "Rejected oversized analyze request");
                AppError::PayloadTooLarge(MSG_TOO_LARGE.to_string())
            }
            AnalyzeError::NotConfigured => AppError::ConfigError(anyhow::anyhow!("{}", err)),
            AnalyzeError::Upstream(provider_err) => upstream_to_app_error(&provider_err),
            AnalyzeError::NoFood { message } => AppError::Rejected {
                code: "no_food".to_string(),
                message,
            },
            AnalyzeError::InvalidResponse
            | AnalyzeError::EmptyResponse
            | AnalyzeError::MalformedOutput
            | AnalyzeError::NoValidRecipes => AppError::UpstreamError(err.to_string()),
        }
    }
}

/// Upstream failures never reach the client verbatim; they collapse to a
/// fixed message chosen by the upstream status.
fn upstream_to_app_error(err: &ProviderError) -> AppError {
    match err.status() {
        Some(429) => AppError::TooManyRequests(MSG_BUSY.to_string(), None),
        Some(400) => AppError::BadRequest(MSG_BAD_IMAGE.to_string()),
        Some(401) => AppError::UpstreamError(MSG_AUTH_FAILED.to_string()),
        _ => AppError::UpstreamError(MSG_GENERIC.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service_core::axum::http::StatusCode;

    fn app_error(err: ProviderError) -> AppError {
        AnalyzeError::from(err).into()
    }

    #[test]
    fn rate_limit_maps_to_busy_429() {
        let err = app_error(ProviderError::RateLimited);
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert!(matches!(err, AppError::TooManyRequests(ref m, _) if m == MSG_BUSY));
    }

    #[test]
    fn upstream_400_maps_to_bad_image() {
        let err = app_error(ProviderError::ApiError {
            status: 400,
            message: "bad".into(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::BadRequest(ref m) if m == MSG_BAD_IMAGE));
    }

    #[test]
    fn upstream_401_maps_to_auth_500() {
        let err = app_error(ProviderError::ApiError {
            status: 401,
            message: "no key".into(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, AppError::UpstreamError(ref m) if m == MSG_AUTH_FAILED));
    }

    #[test]
    fn other_upstream_failures_are_generic() {
        for err in [
            ProviderError::ApiError {
                status: 503,
                message: "down".into(),
            },
            ProviderError::NetworkError("reset".into()),
        ] {
            let err = app_error(err);
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert!(matches!(err, AppError::UpstreamError(ref m) if m == MSG_GENERIC));
        }
    }

    #[test]
    fn provider_not_configured_is_config_error() {
        let err = app_error(ProviderError::NotConfigured("missing".into()));
        assert!(matches!(err, AppError::ConfigError(ref e) if e.to_string() == "OpenRouter API key not configured"));
    }

    #[test]
    fn no_food_is_rejected_with_code() {
        let err: AppError = AnalyzeError::NoFood {
            message: "Not food".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::Rejected { ref code, .. } if code == "no_food"));
    }

    #[test]
    fn oversized_body_gets_fixed_message() {
        let err: AppError = AnalyzeError::BodyTooLarge(
            "Failed to buffer the request body: length limit exceeded".into(),
        )
        .into();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(matches!(err, AppError::PayloadTooLarge(ref m) if m == MSG_TOO_LARGE));
    }
}
