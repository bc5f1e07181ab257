#![allow(dead_code)]

use flavorlens::config::{LimitsConfig, ObservabilityConfig, OpenRouterConfig, RelayConfig};
use flavorlens::services::providers::VisionProvider;
use flavorlens::startup::Application;
use secrecy::Secret;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

pub const FIRST_MODEL: &str = "test/vision-a";
pub const SECOND_MODEL: &str = "test/vision-b";

/// One JPEG header's worth of base64; the relay never decodes it.
pub const SAMPLE_IMAGE: &str = "/9j/4AAQSkZJRgABAQAAAQABAAD";

pub const RECIPES_JSON: &str = r#"[
    {"recipeName":"Caprese Salad","description":"Tomato and mozzarella","mainIngredients":["tomato","mozzarella","basil"],"instructions":["Slice","Layer","Season"],"time":"10 minutes"},
    {"recipeName":"Bruschetta","description":"Toasted bread with tomato","mainIngredients":["bread","tomato","garlic"],"instructions":["Toast","Top"],"time":"15 minutes"},
    {"recipeName":"Tomato Soup","description":"Warm and simple","mainIngredients":["tomato","onion","stock"],"instructions":["Saute","Simmer","Blend"],"time":"40 minutes"}
]"#;

pub fn test_config(base_url: &str, api_key: Option<&str>) -> RelayConfig {
    RelayConfig {
        common: service_core::config::Config {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0, // Random port
        },
        openrouter: OpenRouterConfig {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            base_url: base_url.to_string(),
            models: vec![FIRST_MODEL.to_string(), SECOND_MODEL.to_string()],
            timeout_secs: 5,
            ..OpenRouterConfig::default()
        },
        limits: LimitsConfig::default(),
        observability: ObservabilityConfig::default(),
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Relay talking to a real OpenRouter client pointed at `upstream`.
    pub async fn spawn(upstream: &str, api_key: Option<&str>) -> Self {
        let app = Application::build(test_config(upstream, api_key))
            .await
            .expect("Failed to build application");
        Self::run(app).await
    }

    /// Relay using any provider, typically the scripted mock.
    pub async fn spawn_with_provider(provider: Arc<dyn VisionProvider>) -> Self {
        let app = Application::build_with_provider(
            test_config("http://127.0.0.1:9", Some("test-key")),
            provider,
        )
        .await
        .expect("Failed to build application");
        Self::run(app).await
    }

    async fn run(app: Application) -> Self {
        let port = app.port();

        tokio::spawn(async move {
            let _ = app.run_until_stopped().await;
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            address: format!("http://127.0.0.1:{}", port),
            port,
        }
    }
}
