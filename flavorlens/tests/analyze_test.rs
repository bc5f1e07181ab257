//! Router-level tests for `POST /api/analyze` driven by the scripted provider.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::{test_config, FIRST_MODEL, RECIPES_JSON, SAMPLE_IMAGE, SECOND_MODEL};
use flavorlens::error::{MSG_AUTH_FAILED, MSG_BAD_IMAGE, MSG_BUSY, MSG_GENERIC, MSG_TOO_LARGE};
use flavorlens::services::providers::mock::{MockReply, MockVisionProvider};
use flavorlens::services::recipe_parser::DEFAULT_NO_FOOD_MESSAGE;
use flavorlens::startup::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn router(provider: Arc<MockVisionProvider>) -> Router {
    build_router(AppState::new(
        test_config("http://127.0.0.1:9", Some("test-key")),
        provider,
    ))
}

fn text(reply: &str) -> Arc<MockVisionProvider> {
    Arc::new(MockVisionProvider::new(MockReply::Text(reply.to_string())))
}

async fn post_json(app: Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn analyze(app: Router) -> (StatusCode, Value) {
    post_json(
        app,
        json!({ "image": SAMPLE_IMAGE, "mimeType": "image/jpeg" }).to_string(),
    )
    .await
}

// ============================================================================
// Successful analysis
// ============================================================================

#[tokio::test]
async fn three_valid_recipes_are_returned_intact() {
    let (status, body) = analyze(router(text(RECIPES_JSON))).await;

    assert_eq!(status, StatusCode::OK);
    let recipes = body["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 3);
    for recipe in recipes {
        for field in ["recipeName", "description", "mainIngredients", "instructions", "time"] {
            assert!(!recipe[field].is_null(), "missing {field}");
        }
    }
    assert_eq!(recipes[0]["recipeName"], "Caprese Salad");
}

#[tokio::test]
async fn fenced_reply_is_unwrapped() {
    let fenced = format!("Here you go:\n```json\n{}\n```\nEnjoy!", RECIPES_JSON);
    let (status, body) = analyze(router(text(&fenced))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipes"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn incomplete_recipes_are_dropped() {
    let reply = r#"[
        {"recipeName":"Good","description":"ok","mainIngredients":["a"],"instructions":["b"],"time":"5 minutes"},
        {"recipeName":"No time","description":"ok","mainIngredients":["a"],"instructions":["b"]},
        {"recipeName":"Bad list","description":"ok","mainIngredients":"a","instructions":["b"],"time":"5 minutes"}
    ]"#;
    let (status, body) = analyze(router(text(reply))).await;

    assert_eq!(status, StatusCode::OK);
    let recipes = body["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["recipeName"], "Good");
}

#[tokio::test]
async fn missing_mime_type_defaults_to_jpeg() {
    let (status, _) = post_json(
        router(text(RECIPES_JSON)),
        json!({ "image": SAMPLE_IMAGE }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Model fallback
// ============================================================================

#[tokio::test]
async fn rate_limited_first_model_falls_back_to_second() {
    let provider = Arc::new(
        MockVisionProvider::new(MockReply::Text(RECIPES_JSON.to_string()))
            .with_reply(FIRST_MODEL, MockReply::Status(429)),
    );

    let (status, body) = analyze(router(provider.clone())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipes"].as_array().unwrap().len(), 3);
    assert_eq!(provider.calls(), vec![FIRST_MODEL, SECOND_MODEL]);
}

#[tokio::test]
async fn all_models_rate_limited_is_busy() {
    let provider = Arc::new(MockVisionProvider::new(MockReply::Status(429)));

    let (status, body) = analyze(router(provider.clone())).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], MSG_BUSY);
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn non_rate_limit_errors_skip_the_fallback() {
    let provider = Arc::new(
        MockVisionProvider::new(MockReply::Text(RECIPES_JSON.to_string()))
            .with_reply(FIRST_MODEL, MockReply::Status(503)),
    );

    let (status, body) = analyze(router(provider.clone())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], MSG_GENERIC);
    assert_eq!(provider.calls(), vec![FIRST_MODEL]);
}

#[tokio::test]
async fn upstream_statuses_map_to_fixed_messages() {
    let cases = [
        (400, StatusCode::BAD_REQUEST, MSG_BAD_IMAGE),
        (401, StatusCode::INTERNAL_SERVER_ERROR, MSG_AUTH_FAILED),
        (500, StatusCode::INTERNAL_SERVER_ERROR, MSG_GENERIC),
    ];

    for (upstream, expected, message) in cases {
        let provider = Arc::new(MockVisionProvider::new(MockReply::Status(upstream)));
        let (status, body) = analyze(router(provider)).await;

        assert_eq!(status, expected, "upstream {upstream}");
        assert_eq!(body["error"], message, "upstream {upstream}");
    }
}

#[tokio::test]
async fn network_failure_is_generic() {
    let provider = Arc::new(MockVisionProvider::new(MockReply::Network));
    let (status, body) = analyze(router(provider)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], MSG_GENERIC);
}

// ============================================================================
// Reply validation
// ============================================================================

#[tokio::test]
async fn no_food_sentinel_is_a_400_with_message() {
    let reply = r#"{"error":"no_food","message":"That looks like a bicycle."}"#;
    let (status, body) = analyze(router(text(reply))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no_food");
    assert_eq!(body["message"], "That looks like a bicycle.");
}

#[tokio::test]
async fn no_food_without_message_uses_default() {
    let (status, body) = analyze(router(text(r#"{"error":"no_food"}"#))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], DEFAULT_NO_FOOD_MESSAGE);
}

#[tokio::test]
async fn malformed_json_is_a_500_parse_failure() {
    let (status, body) = analyze(router(text("Sure! Here are some recipes: [oops"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse AI response as JSON");
}

#[tokio::test]
async fn null_reply_is_a_500_parse_failure() {
    let (status, body) = analyze(router(text("null"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse AI response as JSON");
}

#[tokio::test]
async fn zero_valid_recipes_is_a_500() {
    let reply = r#"[{"recipeName":"Half a recipe","time":"5 minutes"}]"#;
    let (status, body) = analyze(router(text(reply))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No valid recipes found in AI response");
}

#[tokio::test]
async fn empty_content_is_a_500() {
    let provider = Arc::new(MockVisionProvider::new(MockReply::NoContent));
    let (status, body) = analyze(router(provider)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Empty response from AI");
}

#[tokio::test]
async fn missing_choice_is_a_500() {
    let provider = Arc::new(MockVisionProvider::new(MockReply::NoChoices));
    let (status, body) = analyze(router(provider)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Invalid response from AI");
}

// ============================================================================
// Request validation
// ============================================================================

#[tokio::test]
async fn missing_image_is_rejected_without_calling_upstream() {
    let provider = text(RECIPES_JSON);
    let (status, body) = post_json(router(provider.clone()), json!({}).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image provided");
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn empty_image_is_rejected() {
    let (status, body) =
        post_json(router(text(RECIPES_JSON)), json!({ "image": "" }).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image provided");
}

#[tokio::test]
async fn null_image_is_reported_as_missing() {
    let provider = text(RECIPES_JSON);
    let (status, body) = post_json(
        router(provider.clone()),
        json!({ "image": null, "mimeType": "image/png" }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image provided");
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let (status, body) = post_json(router(text(RECIPES_JSON)), "{not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let mut config = test_config("http://127.0.0.1:9", Some("test-key"));
    config.limits.max_image_bytes = 1024;
    let app = build_router(AppState::new(config, text(RECIPES_JSON)));

    let big = "A".repeat(4096);
    let (status, body) = post_json(app, json!({ "image": big }).to_string()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], MSG_TOO_LARGE);
}

#[tokio::test]
async fn missing_api_key_is_a_500() {
    let provider = Arc::new(
        MockVisionProvider::new(MockReply::Text(RECIPES_JSON.to_string())).unconfigured(),
    );
    let (status, body) = analyze(router(provider.clone())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "OpenRouter API key not configured");
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn api_responses_carry_strict_csp() {
    let response = router(text(RECIPES_JSON))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "image": SAMPLE_IMAGE }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let csp = response
        .headers()
        .get(header::CONTENT_SECURITY_POLICY)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(csp.starts_with("default-src 'none'"));
    assert!(response.headers().contains_key("x-request-id"));
}
