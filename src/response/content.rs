//! Extraction of the assistant message from the chat-completion envelope

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{AppError, Result};

/// The slice of the chat-completion envelope we care about
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Pull the first choice's message content out of the upstream body
pub fn extract_content(body: &str) -> Result<String> {
    let envelope: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "Failed to parse inference API envelope");
        AppError::InvalidUpstreamFormat
    })?;

    let choice = envelope.choices.into_iter().next().ok_or_else(|| {
        error!("Inference API envelope contained no choices");
        AppError::InvalidUpstreamFormat
    })?;

    Ok(choice.message.content)
}

/// Strip an optional markdown code fence and parse the remainder as JSON.
///
/// Models frequently wrap their output in ```` ```json ... ``` ```` even when
/// told not to; both the labelled and bare fence forms are tolerated.
pub fn parse_fenced_json(text: &str) -> Result<Value> {
    let mut content = text.trim();

    if let Some(rest) = content.strip_prefix("```json") {
        content = rest.trim();
    }
    if let Some(rest) = content.strip_prefix("```") {
        content = rest.trim();
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest.trim();
    }

    debug!(len = content.len(), "Parsing analysis content as JSON");

    serde_json::from_str(content).map_err(|e| {
        error!(error = %e, "Failed to parse analysis content as JSON");
        AppError::InvalidUpstreamFormat
    })
}
