//! Image-to-recipes analysis: prompt, model fallback, reply validation.

use crate::error::AnalyzeError;
use crate::models::Recipe;
use crate::services::metrics;
use crate::services::providers::{
    Completion, GenerationParams, InlineImage, ProviderError, VisionProvider, VisionRequest,
};
use crate::services::recipe_parser::{self, RecipeReply};
use std::sync::Arc;
use std::time::Instant;

/// Instruction sent with every image.
pub const RECIPE_PROMPT: &str = "You are an expert chef and food identification specialist. \
First, carefully examine this image and determine if it contains food, ingredients, or food-related items. \
If the image does NOT contain food, ingredients, or anything edible, respond with exactly: \
{\"error\": \"no_food\", \"message\": \"This image doesn't contain food or ingredients. Please upload an image with food items to generate recipes.\"}. \
If the image DOES contain food or ingredients, identify them and return 3-5 structured recipes in JSON with: \
recipeName, description, mainIngredients, instructions, and time. \
Return ONLY a valid JSON array of recipe objects or the error object, no other text.";

/// Runs one analysis against an ordered list of models.
pub struct RecipeAnalyzer {
    provider: Arc<dyn VisionProvider>,
    models: Vec<String>,
    params: GenerationParams,
}

impl RecipeAnalyzer {
    pub fn new(
        provider: Arc<dyn VisionProvider>,
        models: Vec<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            provider,
            models,
            params,
        }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_configured()
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Ask the upstream for recipes matching `image`.
    pub async fn analyze(&self, image: InlineImage) -> Result<Vec<Recipe>, AnalyzeError> {
        if !self.provider.is_configured() {
            return Err(AnalyzeError::NotConfigured);
        }

        let request = VisionRequest {
            prompt: RECIPE_PROMPT.to_string(),
            image,
            params: self.params.clone(),
        };

        let (model, completion) = self.complete_with_fallback(&request).await?;

        let content = completion
            .text
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(AnalyzeError::EmptyResponse)?;

        tracing::info!(
            model = %model,
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
            "Received completion"
        );

        match recipe_parser::parse_reply(content) {
            Ok(RecipeReply::NoFood { message }) => {
                tracing::info!(model = %model, "Model reported no food in image");
                Err(AnalyzeError::NoFood { message })
            }
            Ok(RecipeReply::Recipes(recipes)) if recipes.is_empty() => {
                tracing::warn!(model = %model, raw_content = %content, "No valid recipes in completion");
                Err(AnalyzeError::NoValidRecipes)
            }
            Ok(RecipeReply::Recipes(recipes)) => Ok(recipes),
            Err(e) => {
                tracing::error!(
                    model = %model,
                    error = %e,
                    raw_content = %content,
                    "Failed to parse completion as JSON"
                );
                Err(AnalyzeError::MalformedOutput)
            }
        }
    }

    /// Try each model in order. A rate-limited model hands over to the next;
    /// any other failure ends the attempt.
    async fn complete_with_fallback(
        &self,
        request: &VisionRequest,
    ) -> Result<(String, Completion), AnalyzeError> {
        let provider = self.provider.name();
        let mut last_error: Option<ProviderError> = None;

        for model in &self.models {
            let start = Instant::now();
            let result = self.provider.complete(model, request).await;
            metrics::record_provider_latency(provider, model, start.elapsed().as_secs_f64());

            match result {
                Ok(completion) => return Ok((model.clone(), completion)),
                Err(e) => {
                    metrics::record_provider_error(provider, e.kind());

                    if e.is_rate_limited() {
                        tracing::warn!(model = %model, "Model rate limited, trying next model");
                        last_error = Some(e);
                        continue;
                    }

                    tracing::error!(model = %model, error = %e, "Model request failed");
                    return Err(e.into());
                }
            }
        }

        Err(last_error
            .map(AnalyzeError::from)
            .unwrap_or_else(|| {
                AnalyzeError::Upstream(ProviderError::NotConfigured(
                    "No models configured".to_string(),
                ))
            }))
    }
}
