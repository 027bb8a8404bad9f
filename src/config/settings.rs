//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

/// Cross-origin configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Upstream inference API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Chat-completion endpoint URL. Empty means not configured.
    #[serde(default)]
    pub endpoint: String,
    /// Bearer token for the endpoint. Empty means not configured.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "Llama-4-Maverick-17B-128E-Instruct-FP8".to_string()
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5001)?
            .set_default("upstream.model", default_model())?
            .set_default("upstream.max_tokens", default_max_tokens() as i64)?
            .set_default("upstream.timeout_secs", default_timeout_secs() as i64)?
            // Load from configuration file
            .add_source(
                File::with_name(path.as_ref().to_str().unwrap_or("config/default"))
                    .required(false),
            )
            // Override with environment variables (prefixed with ANALYSIS_GATEWAY_)
            .add_source(
                Environment::with_prefix("ANALYSIS_GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        for origin in &self.cors.allowed_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Invalid CORS origin '{}'",
                    origin
                ))));
            }
        }

        Ok(())
    }

    /// Whether both upstream credentials are present. Checked per-request so
    /// the service still boots (and answers the liveness probe) without them.
    pub fn has_upstream_credentials(&self) -> bool {
        !self.upstream.endpoint.is_empty() && !self.upstream.api_key.is_empty()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            cors: CorsConfig::default(),
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
