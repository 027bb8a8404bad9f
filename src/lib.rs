//! UI Change Analysis Gateway
//!
//! A single-route backend relay: accepts two UI screenshots plus structured
//! user feedback, forwards them to a multimodal chat-completion API, and
//! returns the validated structured analysis.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod feedback;
pub mod prompt;
pub mod response;

pub use error::{AppError, Result};

use backend::InferenceClient;

/// Application state shared across all handlers. Read-only after startup.
pub struct AppState {
    pub settings: config::Settings,
    pub inference: InferenceClient,
}
