//! HTTP client for the multimodal chat-completion API
//!
//! Builds the OpenAI-style request carrying the analysis prompt plus both
//! screenshots as base64 data URIs, performs the single outbound POST, and
//! classifies failures into the gateway's error taxonomy.

use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};

/// Detail hint sent with each image; keeps upstream token cost down
const IMAGE_DETAIL: &str = "low";

/// An uploaded screenshot: raw bytes plus the declared MIME type
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl UploadedImage {
    pub fn new(data: Vec<u8>, mime_type: Option<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        }
    }

    /// Encode as a `data:` URI the chat-completion API accepts inline
    fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// Chat-completion request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

/// One element of a multimodal message
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

/// Client for the configured inference endpoint
pub struct InferenceClient {
    client: Client,
    config: UpstreamConfig,
}

impl InferenceClient {
    /// Create a client from upstream configuration. The reqwest client is
    /// built once with the configured timeout and reused across requests.
    pub fn new(config: UpstreamConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Send the analysis request and return the raw upstream response body.
    ///
    /// The caller is responsible for interpreting the body; this method only
    /// deals with transport-level outcomes.
    pub async fn analyze(
        &self,
        prompt: String,
        before: &UploadedImage,
        after: &UploadedImage,
    ) -> Result<String> {
        if self.config.endpoint.is_empty() || self.config.api_key.is_empty() {
            error!("Upstream endpoint or API key not configured");
            return Err(AppError::MissingCredentials);
        }

        let payload = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: before.to_data_url(),
                            detail: IMAGE_DETAIL,
                        },
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: after.to_data_url(),
                            detail: IMAGE_DETAIL,
                        },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
        };

        info!(endpoint = %self.config.endpoint, model = %self.config.model, "Sending analysis request");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Inference API request timed out");
                    AppError::UpstreamTimeout
                } else {
                    error!(error = %e, "Error communicating with inference API");
                    AppError::UpstreamTransport(e)
                }
            })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(500).collect();
            error!(status = %status, body = %snippet, "Inference API returned error status");
            return Err(AppError::UpstreamStatus {
                status: StatusCode::from_u16(status.as_u16())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
            });
        }

        debug!(status = %status, "Received successful response from inference API");

        response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read inference API response body");
            AppError::UpstreamTransport(e)
        })
    }
}
