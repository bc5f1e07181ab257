//! Turns free-text model output into validated recipes.
//!
//! Models are asked for bare JSON but often wrap it in a Markdown code
//! fence. The reply is either a list of recipe objects, a single recipe
//! object, or the `{"error": "no_food"}` sentinel.

use crate::models::Recipe;
use serde_json::Value;

/// Message used when the sentinel arrives without one.
pub const DEFAULT_NO_FOOD_MESSAGE: &str = "This image doesn't contain food or ingredients. \
     Please upload an image with food items to generate recipes.";

const NO_FOOD_SENTINEL: &str = "no_food";

/// Outcome of interpreting a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeReply {
    /// The model reported that the image shows no food.
    NoFood { message: String },
    /// Candidates that passed validation, in reply order. May be empty.
    Recipes(Vec<Recipe>),
}

/// Strip an optional Markdown code fence.
///
/// A ```` ```json ```` fence wins over a bare one. The text between the
/// opening fence and the next fence is returned trimmed; an unterminated
/// fence yields everything after it.
pub fn strip_code_fence(content: &str) -> &str {
    let inner = if let Some((_, rest)) = content.split_once("```json") {
        rest
    } else if let Some((_, rest)) = content.split_once("```") {
        rest
    } else {
        return content.trim();
    };

    inner.split("```").next().unwrap_or(inner).trim()
}

/// Parse a model reply. Fails when the (unfenced) text is not JSON or is a
/// bare `null`.
pub fn parse_reply(content: &str) -> Result<RecipeReply, serde_json::Error> {
    let value: Value = serde_json::from_str(strip_code_fence(content))?;

    // A bare `null` carries neither recipes nor the sentinel.
    if value.is_null() {
        return Err(serde::de::Error::custom("reply is JSON null"));
    }

    if let Some(message) = no_food_message(&value) {
        return Ok(RecipeReply::NoFood { message });
    }

    let candidates = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    let total = candidates.len();
    let recipes: Vec<Recipe> = candidates.into_iter().filter_map(validate_candidate).collect();

    if recipes.len() < total {
        tracing::debug!(
            total,
            valid = recipes.len(),
            "Dropped recipe candidates with missing or malformed fields"
        );
    }

    Ok(RecipeReply::Recipes(recipes))
}

fn no_food_message(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if object.get("error").and_then(Value::as_str) != Some(NO_FOOD_SENTINEL) {
        return None;
    }

    let message = object
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_NO_FOOD_MESSAGE);

    Some(message.to_string())
}

fn validate_candidate(candidate: Value) -> Option<Recipe> {
    if !candidate.is_object() {
        return None;
    }
    serde_json::from_value::<Recipe>(candidate)
        .ok()
        .filter(Recipe::is_complete)
}
