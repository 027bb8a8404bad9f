//! Structural validation of the analysis object
//!
//! Checks key presence and object-ness only. Values are passed through to the
//! client untouched, so there is no range checking on the percentages and
//! extra keys are tolerated.

use serde_json::Value;
use tracing::error;

use crate::error::{AppError, Result};

const SUMMARY_KEYS: [&str; 3] = [
    "key_changes_narrative",
    "addressed_issues",
    "outstanding_issues",
];
const FEEDBACK_ANALYSIS_KEYS: [&str; 2] = ["sentiment_summary", "sentiment_scores"];
const SENTIMENT_SCORE_KEYS: [&str; 3] = ["positive_percent", "neutral_percent", "negative_percent"];

/// Validate that the parsed analysis matches the required shape
pub fn validate_analysis(analysis: &Value) -> Result<()> {
    if check_structure(analysis) {
        Ok(())
    } else {
        error!("Analysis JSON missing expected structure");
        Err(AppError::IncompleteStructure)
    }
}

fn check_structure(analysis: &Value) -> bool {
    let Some(root) = analysis.as_object() else {
        return false;
    };

    let Some(summary) = root.get("summary_section").and_then(Value::as_object) else {
        return false;
    };
    let Some(feedback_analysis) = root
        .get("feedback_analysis_section")
        .and_then(Value::as_object)
    else {
        return false;
    };

    if !SUMMARY_KEYS.iter().all(|k| summary.contains_key(*k)) {
        return false;
    }
    if !FEEDBACK_ANALYSIS_KEYS
        .iter()
        .all(|k| feedback_analysis.contains_key(*k))
    {
        return false;
    }

    let Some(scores) = feedback_analysis
        .get("sentiment_scores")
        .and_then(Value::as_object)
    else {
        return false;
    };

    SENTIMENT_SCORE_KEYS.iter().all(|k| scores.contains_key(*k))
}
