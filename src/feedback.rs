//! Client feedback payload classification and text rendering
//!
//! Feedback arrives as arbitrary JSON. The raw value is kept for echoing back
//! to the client; this module classifies it into one of four shapes and
//! renders each shape into the text block the prompt embeds.

use serde::Deserialize;
use serde_json::Value;

/// One structured feedback entry. Every field is optional; rendering fills
/// in placeholders for whatever is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackItem {
    #[serde(rename = "User Name")]
    pub user_name: Option<String>,
    #[serde(rename = "User Role")]
    pub user_role: Option<String>,
    #[serde(rename = "Pain Points")]
    pub pain_points: Option<String>,
    #[serde(rename = "Suggested Improvements")]
    pub suggested_improvements: Option<String>,
}

/// The shapes client feedback can take, each with its own rendering strategy
#[derive(Debug)]
pub enum FeedbackPayload {
    /// Array of structured entries
    Items(Vec<FeedbackItem>),
    /// Any other JSON object
    Map(serde_json::Map<String, Value>),
    /// Bare string
    Text(String),
    /// Anything else (numbers, booleans, null, arrays of non-objects)
    Unrecognized,
}

impl FeedbackPayload {
    /// Classify a raw feedback value. The value itself is not consumed; the
    /// handler keeps it to echo back as `original_feedback`.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Array(_) => match Vec::<FeedbackItem>::deserialize(value) {
                Ok(items) => Self::Items(items),
                Err(_) => Self::Unrecognized,
            },
            Value::Object(map) => Self::Map(map.clone()),
            Value::String(text) => Self::Text(text.clone()),
            _ => Self::Unrecognized,
        }
    }

    /// Render the payload into the human-readable block embedded in the prompt
    pub fn render(&self) -> String {
        match self {
            Self::Items(items) => {
                let mut text = String::new();
                for item in items {
                    let user = item.user_name.as_deref().unwrap_or("Unknown User");
                    let role = item.user_role.as_deref().unwrap_or("");
                    let pain = item.pain_points.as_deref().unwrap_or("N/A");
                    let suggestion = item.suggested_improvements.as_deref().unwrap_or("N/A");
                    text.push_str(&format!(
                        "- User: {user} ({role})\n  Pain Point: {pain}\n  Suggestion: {suggestion}\n\n"
                    ));
                }
                text
            }
            Self::Map(map) => {
                serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string())
            }
            Self::Text(text) => text.clone(),
            Self::Unrecognized => "No feedback provided or format not recognized.".to_string(),
        }
    }

    /// True for payloads that parsed but carry nothing: `{}`, `[]`, `""`,
    /// `null`, `false`, `0`. These are accepted, only warn-logged upstream.
    pub fn is_empty_value(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
        }
    }
}
