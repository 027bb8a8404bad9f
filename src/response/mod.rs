//! Response handling module - upstream envelope extraction and validation

pub mod content;
pub mod validate;

use serde_json::Value;

use crate::error::Result;

/// Reconcile a raw upstream response body into the validated analysis object:
/// extract the assistant text from the chat-completion envelope, strip any
/// markdown fences, parse it as JSON, and check the required structure.
pub fn reconcile(body: &str) -> Result<Value> {
    let text = content::extract_content(body)?;
    let analysis = content::parse_fenced_json(&text)?;
    validate::validate_analysis(&analysis)?;
    Ok(analysis)
}
