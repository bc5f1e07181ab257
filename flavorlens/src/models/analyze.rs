use super::Recipe;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Used when the client does not say what kind of image it sent.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Base64 image data without the `data:` URL prefix. `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1, message = "No image provided"))]
    pub image: String,

    #[serde(default)]
    pub mime_type: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl AnalyzeRequest {
    pub fn mime_type(&self) -> &str {
        self.mime_type
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub recipes: Vec<Recipe>,
}
