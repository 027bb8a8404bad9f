//! Request handlers for the analysis gateway

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::backend::UploadedImage;
use crate::error::{AppError, Result};
use crate::feedback::FeedbackPayload;
use crate::{prompt, response, AppState};

/// Liveness probe
pub async fn home() -> &'static str {
    "Analysis backend is running!"
}

/// Collected multipart fields of one analyze request
#[derive(Default)]
struct AnalyzeParts {
    before: Option<UploadedImage>,
    after: Option<UploadedImage>,
    feedback_text: Option<String>,
}

/// `POST /api/analyze-changes`
///
/// Accepts multipart/form-data with file fields `beforeImage` and
/// `afterImage` plus a `feedback` form field holding a JSON string. Relays
/// both screenshots and the rendered feedback to the inference API and
/// returns the validated analysis together with the original feedback.
pub async fn analyze_changes(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Value>> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // A JSON-typed body may carry the feedback value directly, but it cannot
    // carry the image files, so the image requirement fails first.
    if content_type.starts_with("application/json") {
        error!("JSON-typed request cannot carry the required image files");
        return Err(AppError::MissingImages);
    }

    let multipart = Multipart::from_request(request, &()).await.map_err(|_| {
        error!("Missing image files in request");
        AppError::MissingImages
    })?;

    let parts = collect_parts(multipart).await?;

    let (Some(before), Some(after)) = (parts.before, parts.after) else {
        error!("Missing image files in request");
        return Err(AppError::MissingImages);
    };

    let feedback: Value = match parts.feedback_text {
        Some(text) => serde_json::from_str(&text).map_err(|_| {
            let snippet: String = text.chars().take(100).collect();
            error!(feedback = %snippet, "Invalid JSON format in feedback field");
            AppError::InvalidFeedbackJson
        })?,
        None => {
            error!("Missing feedback data in form and request is not JSON");
            return Err(AppError::MissingFeedback);
        }
    };

    if FeedbackPayload::is_empty_value(&feedback) {
        warn!("Feedback data parsed as empty");
    }

    info!(
        before_bytes = before.data.len(),
        after_bytes = after.data.len(),
        "Inputs validated, preparing analysis request"
    );

    let feedback_text = FeedbackPayload::classify(&feedback).render();
    let analysis_prompt = prompt::build_prompt(&feedback_text);

    let body = state.inference.analyze(analysis_prompt, &before, &after).await?;
    let analysis = response::reconcile(&body)?;

    info!("Analysis response structure validated");

    Ok(Json(json!({
        "analysis": analysis,
        "original_feedback": feedback,
    })))
}

async fn collect_parts(mut multipart: Multipart) -> Result<AnalyzeParts> {
    let mut parts = AnalyzeParts::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!(error = %e, "Failed to read multipart field");
        AppError::Multipart(e.to_string())
    })? {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("beforeImage") => {
                let mime_type = field.content_type().map(|c| c.to_string());
                let data = field.bytes().await.map_err(|e| {
                    error!(error = %e, "Error reading beforeImage upload");
                    AppError::ImageRead
                })?;
                parts.before = Some(UploadedImage::new(data.to_vec(), mime_type));
            }
            Some("afterImage") => {
                let mime_type = field.content_type().map(|c| c.to_string());
                let data = field.bytes().await.map_err(|e| {
                    error!(error = %e, "Error reading afterImage upload");
                    AppError::ImageRead
                })?;
                parts.after = Some(UploadedImage::new(data.to_vec(), mime_type));
            }
            Some("feedback") => {
                parts.feedback_text = Some(field.text().await.map_err(|e| {
                    error!(error = %e, "Error reading feedback field");
                    AppError::Multipart(e.to_string())
                })?);
            }
            _ => {} // ignore unknown fields
        }
    }

    Ok(parts)
}
