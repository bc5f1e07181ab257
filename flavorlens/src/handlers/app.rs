use crate::client::ACCEPTED_EXTENSIONS;
use crate::startup::AppState;
use askama::Template;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub app_title: String,
    pub accept: String,
    pub max_file_bytes: usize,
    pub max_image_mb: usize,
}

/// Room left for the JSON envelope around the base64 image.
const ENVELOPE_BYTES: usize = 1024;

/// Largest raw image whose base64 upload still fits in `body_limit`.
pub fn max_file_bytes(body_limit: usize) -> usize {
    body_limit.saturating_sub(ENVELOPE_BYTES) / 4 * 3
}

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let max_file_bytes = max_file_bytes(state.config.limits.max_image_bytes);

    IndexTemplate {
        app_title: state.config.openrouter.app_title.clone(),
        accept: ACCEPTED_EXTENSIONS
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(","),
        max_file_bytes,
        max_image_mb: max_file_bytes / (1024 * 1024),
    }
}

/// Liveness probe. Always 200 while the process serves requests.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "flavorlens",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.analyzer.provider_name(),
        "provider_configured": state.analyzer.provider_configured(),
        "models": state.analyzer.models(),
    }))
}

/// Readiness probe. Not ready until upstream credentials are present.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.analyzer.provider_configured() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
