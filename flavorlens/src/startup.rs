//! Application startup and lifecycle management.

use crate::config::RelayConfig;
use crate::handlers::{
    analyze::analyze_handler,
    app::{health_check, index, readiness_check},
    metrics::metrics,
};
use crate::services::metrics::init_metrics;
use crate::services::providers::openrouter::OpenRouterProvider;
use crate::services::providers::{GenerationParams, VisionProvider};
use crate::services::RecipeAnalyzer;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub analyzer: Arc<RecipeAnalyzer>,
}

impl AppState {
    pub fn new(config: RelayConfig, provider: Arc<dyn VisionProvider>) -> Self {
        let analyzer = RecipeAnalyzer::new(
            provider,
            config.openrouter.models.clone(),
            GenerationParams {
                max_tokens: Some(config.openrouter.max_tokens),
                temperature: Some(config.openrouter.temperature),
            },
        );

        Self {
            config,
            analyzer: Arc::new(analyzer),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.limits.max_image_bytes;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route("/api/analyze", post(analyze_handler))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the trace span sees the request id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the OpenRouter provider.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let provider = OpenRouterProvider::new(&config.openrouter)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        if !provider.is_configured() {
            tracing::warn!("OPENROUTER_API_KEY is not set; analyze requests will fail until it is");
        }

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around any provider (tests use the mock).
    pub async fn build_with_provider(
        config: RelayConfig,
        provider: Arc<dyn VisionProvider>,
    ) -> Result<Self, AppError> {
        init_metrics();

        tracing::info!(
            provider = provider.name(),
            models = ?config.openrouter.models,
            "Initialized vision provider"
        );

        // Port 0 = random port for testing
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("FlavorLens relay listening on port {}", port);

        let router = build_router(AppState::new(config, provider));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
