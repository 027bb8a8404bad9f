//! Prompt assembly for the vision analysis request

/// Literal JSON shape the model is instructed to return. Embedded in the
/// prompt verbatim, comments included, so the model sees the exact contract
/// the reconciler later validates.
const RESPONSE_SCHEMA: &str = r#"{
  "summary_section": {
    "key_changes_narrative": "A paragraph summarizing the key changes from 'before' to 'after', highlighting how user feedback was addressed.",
    "addressed_issues": ["Bullet point string describing a specific user pain point from the feedback that appears resolved/improved in the 'after' UI."],
    "outstanding_issues": ["Bullet point string describing potential issues still present in the 'after' UI or feedback points not addressed."]
  },
  "feedback_analysis_section": {
    "sentiment_summary": "A brief text summarizing the overall sentiment (positive, negative, neutral) and key themes found ONLY in the provided user feedback.",
    "sentiment_scores": {
      "positive_percent": /* integer percentage, e.g., 20 */,
      "neutral_percent":  /* integer percentage, e.g., 20 */,
      "negative_percent": /* integer percentage, e.g., 60 */
    }
  }
}"#;

/// Build the instruction prompt around the rendered feedback text
pub fn build_prompt(feedback_text: &str) -> String {
    format!(
        "You are a product manager or a product person who has deep insights into the product and analyzes data really well. \
         Analyze the visual difference between the 'before' and 'after' UI screenshots provided, considering the user feedback for the 'before' version. \
         Give a concise summary of the changes and insights based ONLY on the provided visuals and feedback text.\n\n\
         User Feedback for 'before' version:\n\
         <UserFeedback>\n{feedback_text}\n</UserFeedback>\n\n\
         Return your analysis ONLY in the following valid JSON structure, with no extra text before or after:\n\
         {RESPONSE_SCHEMA}"
    )
}
