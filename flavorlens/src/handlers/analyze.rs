use crate::error::AnalyzeError;
use crate::models::{AnalyzeRequest, AnalyzeResponse, Recipe};
use crate::services::metrics;
use crate::services::providers::InlineImage;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

/// `POST /api/analyze`: turn an uploaded food photo into recipe suggestions.
pub async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    match analyze(&state, payload).await {
        Ok(recipes) => {
            metrics::record_analyze_outcome("success");
            metrics::record_recipes_returned(recipes.len());
            tracing::info!(recipes = recipes.len(), "Returning recipes");
            Ok(Json(AnalyzeResponse { recipes }))
        }
        Err(e) => {
            metrics::record_analyze_outcome(e.kind());
            Err(e.into())
        }
    }
}

async fn analyze(
    state: &AppState,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Vec<Recipe>, AnalyzeError> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AnalyzeError::BodyTooLarge(rejection.body_text())
        } else {
            AnalyzeError::InvalidBody(rejection.body_text())
        }
    })?;

    request.validate().map_err(|_| AnalyzeError::MissingImage)?;

    let mime_type = request.mime_type().to_string();
    tracing::info!(
        mime_type = %mime_type,
        image_bytes = request.image.len(),
        "Analyzing image"
    );

    state
        .analyzer
        .analyze(InlineImage::new(mime_type, request.image))
        .await
}
