use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// OpenRouter's OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Tried in order; a rate-limited model hands over to the next one.
pub const DEFAULT_MODELS: &[&str] = &["google/gemini-flash-1.5", "google/gemini-2.0-flash-001"];

const DEFAULT_APP_TITLE: &str = "FlavorLens";
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default request body cap (10 MiB). Base64 inflates images by a third, so
/// this admits photos of roughly 7.5 MB.
const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub openrouter: OpenRouterConfig,
    pub limits: LimitsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Absent keys are reported per request, the server still starts.
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    /// Sent as `X-Title` so requests are attributed to the app.
    pub app_title: String,
    pub models: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_image_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            otlp_endpoint: None,
        }
    }
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_env(common_config)
    }

    /// Read the service settings from the process environment on top of an
    /// already loaded common config.
    ///
    /// With `ENVIRONMENT=prod` the upstream endpoint and model list must be
    /// given explicitly.
    pub fn from_env(common: core_config::Config) -> Result<Self, AppError> {
        let is_prod = env::var("ENVIRONMENT").unwrap_or_default() == "prod";
        let defaults = OpenRouterConfig::default();

        let models = match get_optional_env("OPENROUTER_MODELS") {
            Some(raw) => parse_models(&raw)?,
            None if is_prod => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "OPENROUTER_MODELS is required in production but not set"
                )))
            }
            None => defaults.models,
        };

        Ok(RelayConfig {
            common,
            openrouter: OpenRouterConfig {
                api_key: get_optional_env("OPENROUTER_API_KEY").map(Secret::new),
                base_url: get_env("OPENROUTER_BASE_URL", Some(DEFAULT_BASE_URL), is_prod)?
                    .trim_end_matches('/')
                    .to_string(),
                app_title: get_env("OPENROUTER_APP_TITLE", Some(DEFAULT_APP_TITLE), false)?,
                models,
                max_tokens: parse_env("OPENROUTER_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
                temperature: parse_env("OPENROUTER_TEMPERATURE", DEFAULT_TEMPERATURE)?,
                timeout_secs: parse_env("OPENROUTER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            },
            limits: LimitsConfig {
                max_image_bytes: parse_env("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            },
            observability: ObservabilityConfig {
                log_level: get_env("LOG_LEVEL", Some("info"), false)?,
                otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
            },
        })
    }
}

/// Split a comma separated model list, keeping order and dropping blanks.
pub fn parse_models(raw: &str) -> Result<Vec<String>, AppError> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "OPENROUTER_MODELS must list at least one model"
        )));
    }

    Ok(models)
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e))
        }),
        None => Ok(default),
    }
}
