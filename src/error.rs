//! Common error types for the analysis gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required image files ('beforeImage', 'afterImage')")]
    MissingImages,

    #[error("Missing feedback data (expected in form field 'feedback')")]
    MissingFeedback,

    #[error("Invalid JSON format in feedback field")]
    InvalidFeedbackJson,

    #[error("Malformed multipart request: {0}")]
    Multipart(String),

    #[error("Could not read image files")]
    ImageRead,

    #[error("Server configuration error: Missing API credentials.")]
    MissingCredentials,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Analysis service timed out.")]
    UpstreamTimeout,

    /// Upstream answered with an error status. The body snippet stays in the
    /// logs; the client only sees the generic message.
    #[error("Failed to get analysis from external service.")]
    UpstreamStatus { status: StatusCode },

    #[error("Failed to get analysis from external service.")]
    UpstreamTransport(#[source] reqwest::Error),

    #[error("Analysis service returned invalid data format.")]
    InvalidUpstreamFormat,

    #[error("Analysis service returned incomplete data structure.")]
    IncompleteStructure,
}

/// Error response format returned to the client: a single human-readable
/// string, nothing else.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingImages
            | AppError::MissingFeedback
            | AppError::InvalidFeedbackJson
            | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::ImageRead | AppError::MissingCredentials | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::UpstreamStatus { status } => {
                if status.as_u16() >= 400 {
                    *status
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            AppError::UpstreamTransport(_)
            | AppError::InvalidUpstreamFormat
            | AppError::IncompleteStructure => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
