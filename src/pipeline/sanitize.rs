//! Output sanitisation: strip markdown fences from model output, then parse JSON.
//!
//! Models are told to answer with a bare JSON object, but they regularly wrap
//! it in ```` ```json ... ``` ```` anyway. Stripping the fences is a
//! best-effort normalisation, not a guarantee: whatever remains must parse as
//! JSON or the stage fails with [`McqError::Parse`]. Malformed output is never
//! passed through as text.

use crate::error::{McqError, Stage};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// The tagged marker must be tried first so "```json" is removed whole.
static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```json|```").unwrap());

/// Remove every ```` ```json ```` and ```` ``` ```` marker and trim the result.
pub fn strip_fences(raw: &str) -> String {
    RE_FENCE.replace_all(raw, "").trim().to_string()
}

/// Strip fences from `raw` and parse the remainder as JSON.
///
/// # Errors
/// [`McqError::Parse`] (attributed to `stage`) when the cleaned text is not
/// valid JSON.
pub fn parse_model_output(stage: Stage, raw: &str) -> Result<Value, McqError> {
    let cleaned = strip_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| McqError::Parse {
        stage,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const QUIZ: &str = r#"{"1": {"mcq": "What is 2 + 2?", "option": {"a": "3", "b": "4", "c": "5", "d": "22"}, "correct": "b"}}"#;

    #[test]
    fn test_strip_tagged_fence() {
        let input = format!("```json\n{QUIZ}\n```");
        assert_eq!(strip_fences(&input), QUIZ);
    }

    #[test]
    fn test_strip_plain_fence() {
        let input = format!("```\n{QUIZ}\n```\n");
        assert_eq!(strip_fences(&input), QUIZ);
    }

    #[test]
    fn test_no_fences_passthrough() {
        assert_eq!(strip_fences(QUIZ), QUIZ);
        assert_eq!(strip_fences(&format!("  \n{QUIZ}\n ")), QUIZ);
    }

    #[test]
    fn test_clean_input_is_idempotent() {
        let once = parse_model_output(Stage::Quiz, QUIZ).unwrap();
        let twice = parse_model_output(Stage::Quiz, &once.to_string()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(strip_fences(&strip_fences(QUIZ)), strip_fences(QUIZ));
    }

    #[test]
    fn test_fenced_equals_unfenced() {
        let plain = parse_model_output(Stage::Quiz, QUIZ).unwrap();
        let fenced = parse_model_output(Stage::Quiz, &format!("```json {QUIZ} ```")).unwrap();
        assert_eq!(plain, fenced);
        assert_eq!(plain["1"]["correct"], json!("b"));
    }

    #[test]
    fn test_fences_removed_everywhere() {
        // Markers in the middle of the text are stripped too.
        let input = "```json\n{\"a\": 1}```";
        assert_eq!(parse_model_output(Stage::Review, input).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = parse_model_output(Stage::Review, "```json\nHere is your quiz!\n```").unwrap_err();
        match err {
            McqError::Parse { stage, .. } => assert_eq!(stage, Stage::Review),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_output_is_parse_error() {
        assert!(matches!(
            parse_model_output(Stage::Quiz, "``````"),
            Err(McqError::Parse { stage: Stage::Quiz, .. })
        ));
    }

    #[test]
    fn test_question_order_preserved() {
        let value = parse_model_output(Stage::Quiz, r#"{"2": {}, "10": {}, "1": {}}"#).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["2", "10", "1"]);
    }
}
