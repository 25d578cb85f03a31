//! Helpers for digesting provider responses.
//!
//! Providers are asked to reply with bare JSON but routinely wrap it in
//! markdown code fences or surround it with prose; these helpers normalize
//! that before deserializing.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{OrchestratorError, Result};

/// Strip a markdown code fence (with or without a language tag) from around
/// `raw`, returning the inner text. Input without fences is just trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after = &trimmed[start + 3..];
    let after = match after.find('\n') {
        // drop the language tag line ("json", "rust", ...)
        Some(newline) if after[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &after[newline + 1..]
        }
        _ => after,
    };

    match after.find("```") {
        Some(end) => after[..end].trim(),
        None => after.trim(),
    }
}

/// Deserialize a JSON object out of a provider reply. Falls back to the
/// outermost brace window when the reply embeds JSON in prose.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
                if start < end {
                    if let Ok(value) = serde_json::from_str(&cleaned[start..=end]) {
                        return Ok(value);
                    }
                }
            }
            Err(OrchestratorError::MalformedResponse(first_error.to_string()))
        }
    }
}

/// Read a number out of a JSON value, tolerating numeric strings; models
/// emit both `8` and `"8"` for scores.
pub fn as_f64_lenient(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_passes_through() {
        let value: Value = extract_json(r#"{"score": 8}"#).unwrap();
        assert_eq!(value["score"], json!(8));
    }

    #[test]
    fn test_fenced_json_with_language_tag() {
        let raw = "```json\n{\"score\": 8}\n```";
        let value: Value = extract_json(raw).unwrap();
        assert_eq!(value["score"], json!(8));
    }

    #[test]
    fn test_fenced_json_without_language_tag() {
        let raw = "```\n{\"ok\": true}\n```";
        let value: Value = extract_json(raw).unwrap();
        assert_eq!(value["ok"], json!(true));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let raw = "Sure! Here is the evaluation:\n{\"overall_score\": 7.5}\nHope that helps.";
        let value: Value = extract_json(raw).unwrap();
        assert_eq!(value["overall_score"], json!(7.5));
    }

    #[test]
    fn test_unparseable_reply_is_an_error() {
        let error = extract_json::<Value>("I would rather not answer in JSON.").unwrap_err();
        assert!(matches!(error, OrchestratorError::MalformedResponse(_)));
    }

    #[test]
    fn test_typed_extraction() {
        #[derive(serde::Deserialize)]
        struct Scores {
            overall_score: f64,
        }

        let raw = "```json\n{\"overall_score\": 6.5, \"extra\": \"ignored\"}\n```";
        let scores: Scores = extract_json(raw).unwrap();
        assert_eq!(scores.overall_score, 6.5);
    }

    #[test]
    fn test_lenient_numbers() {
        assert_eq!(as_f64_lenient(&json!(7.5)), Some(7.5));
        assert_eq!(as_f64_lenient(&json!("8")), Some(8.0));
        assert_eq!(as_f64_lenient(&json!(" 6.0 ")), Some(6.0));
        assert_eq!(as_f64_lenient(&json!(true)), None);
        assert_eq!(as_f64_lenient(&json!("hire")), None);
    }
}
