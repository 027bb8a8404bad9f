//! Configuration loading and validation

pub mod settings;

pub use settings::{CorsConfig, LoggingConfig, ServerConfig, Settings, UpstreamConfig};
