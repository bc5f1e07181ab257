//! Upload side of the relay for Rust callers.
//!
//! [`RelayClient`] posts an image the same way the browser page does and
//! sorts the reply into recipes, a "no food" verdict, or a relay error.
//! [`ViewState`] holds what a front end shows while that happens.

pub mod state;

pub use state::{ErrorKind, ErrorNotice, ViewState};

use crate::models::{AnalyzeRequest, Recipe};
use crate::services::recipe_parser::DEFAULT_NO_FOOD_MESSAGE;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// File extensions the upload accepts, matching the browser picker.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];

/// Shown when the relay fails without saying why.
pub const FALLBACK_ERROR: &str = "Failed to analyze image";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unsupported file type '{0}'. Use a JPEG, PNG or WebP image.")]
    UnsupportedFile(String),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    NoFood(String),

    #[error("{message}")]
    Relay { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// MIME type for an accepted image path, judged by extension.
pub fn mime_type_for_path(path: &Path) -> Result<&'static str, ClientError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        _ => Err(ClientError::UnsupportedFile(path.display().to_string())),
    }
}

/// `data:` URL for previewing an image before the analysis returns.
pub fn preview_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

pub struct RelayClient {
    base_url: String,
    http: reqwest::Client,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn analyze_url(&self) -> String {
        format!("{}/api/analyze", self.base_url)
    }

    /// Read, encode and analyze an image file.
    pub async fn analyze_file(&self, path: &Path) -> Result<Vec<Recipe>, ClientError> {
        let mime_type = mime_type_for_path(path)?;
        let bytes = tokio::fs::read(path).await?;
        self.analyze(&bytes, mime_type).await
    }

    /// Send raw image bytes to the relay.
    pub async fn analyze(&self, bytes: &[u8], mime_type: &str) -> Result<Vec<Recipe>, ClientError> {
        let request = AnalyzeRequest {
            image: STANDARD.encode(bytes),
            mime_type: Some(mime_type.to_string()),
        };

        let response = self.http.post(self.analyze_url()).json(&request).send().await?;
        let status = response.status().as_u16();
        let is_success = response.status().is_success();
        // Non-JSON bodies (e.g. a proxy error page) fall through to the generic message.
        let body: Value = response.json().await.unwrap_or(Value::Null);

        classify_reply(status, is_success, body)
    }
}

fn classify_reply(status: u16, is_success: bool, body: Value) -> Result<Vec<Recipe>, ClientError> {
    let error = body.get("error").and_then(Value::as_str);

    if error == Some("no_food") {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_NO_FOOD_MESSAGE);
        return Err(ClientError::NoFood(message.to_string()));
    }

    if !is_success || error.is_some() {
        return Err(ClientError::Relay {
            status,
            message: error.unwrap_or(FALLBACK_ERROR).to_string(),
        });
    }

    match body.get("recipes") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(recipes) => serde_json::from_value(recipes.clone()).map_err(|_| ClientError::Relay {
            status,
            message: FALLBACK_ERROR.to_string(),
        }),
    }
}
