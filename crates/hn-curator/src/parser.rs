/// Recovery of a `Judgment` from free-form model output.
///
/// Models wrap the requested JSON in prose or markdown fences often enough that the raw
/// text is only ever treated as a hint. Strategy: strict decode of the trimmed text, then
/// the widest `{ ... }` span, else failure.
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::JudgeError;
use crate::model::Judgment;

pub const MISSING_SUMMARY: &str = "No summary provided.";
pub const MISSING_REASONING: &str = "No specific reasoning provided.";

fn object_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Greedy and dot-matches-newline: first `{` through last `}`.
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// Parse raw judge output into a `Judgment`.
///
/// Only `relevance_score` is mandatory; `summary` and `reasoning` fall back to
/// placeholder text.
pub fn parse_judgment(raw: &str) -> Result<Judgment, JudgeError> {
    let object = extract_object(raw).ok_or_else(|| {
        JudgeError::MalformedOutput(format!("no JSON object in response: {}", preview(raw)))
    })?;

    let relevance_score = object
        .get("relevance_score")
        .and_then(score_from_value)
        .ok_or_else(|| {
            JudgeError::MalformedOutput(format!(
                "missing or unusable relevance_score: {}",
                preview(raw)
            ))
        })?;

    Ok(Judgment {
        relevance_score,
        summary: text_field(&object, "summary").unwrap_or_else(|| MISSING_SUMMARY.to_string()),
        reasoning: text_field(&object, "reasoning")
            .unwrap_or_else(|| MISSING_REASONING.to_string()),
    })
}

fn extract_object(raw: &str) -> Option<Map<String, Value>> {
    let trimmed = raw.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Some(map);
    }
    let span = object_span_re().find(trimmed)?;
    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Integers, integral floats, and strings holding an integer are usable scores.
fn score_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            // `as` saturates, so anything outside i64 is unusable rather than clamped.
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn preview(raw: &str) -> String {
    const MAX_CHARS: usize = 200;
    let mut out: String = raw.chars().take(MAX_CHARS).collect();
    if raw.chars().count() > MAX_CHARS {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_object() {
        let j = parse_judgment(
            r#"{"relevance_score": 9, "summary": "A Rust compiler deep dive.", "reasoning": "Compilers."}"#,
        )
        .unwrap();
        assert_eq!(j.relevance_score, 9);
        assert_eq!(j.summary, "A Rust compiler deep dive.");
        assert_eq!(j.reasoning, "Compilers.");
    }

    #[test]
    fn test_parse_object_wrapped_in_prose() {
        let j = parse_judgment(r#"Sure! {"relevance_score":9,"summary":"x","reasoning":"y"} Thanks"#)
            .unwrap();
        assert_eq!(j.relevance_score, 9);
        assert_eq!(j.summary, "x");
        assert_eq!(j.reasoning, "y");
    }

    #[test]
    fn test_parse_markdown_fenced_object() {
        let raw = "Here is my evaluation:\n```json\n{\n  \"relevance_score\": 3,\n  \"summary\": \"Celebrity gossip.\",\n  \"reasoning\": \"Off topic.\"\n}\n```\n";
        let j = parse_judgment(raw).unwrap();
        assert_eq!(j.relevance_score, 3);
        assert_eq!(j.reasoning, "Off topic.");
    }

    #[test]
    fn test_plain_text_is_malformed() {
        let err = parse_judgment("I think this article is quite relevant, maybe an 8.").unwrap_err();
        assert!(matches!(err, JudgeError::MalformedOutput(_)));
    }

    #[test]
    fn test_missing_score_is_malformed() {
        let err = parse_judgment(r#"{"summary": "x", "reasoning": "y"}"#).unwrap_err();
        assert!(matches!(err, JudgeError::MalformedOutput(_)));

        let err = parse_judgment(r#"{"relevance_score": null, "summary": "x"}"#).unwrap_err();
        assert!(matches!(err, JudgeError::MalformedOutput(_)));

        let err = parse_judgment(r#"{"relevance_score": "high"}"#).unwrap_err();
        assert!(matches!(err, JudgeError::MalformedOutput(_)));
    }

    #[test]
    fn test_widest_span_spanning_two_objects_fails() {
        // The greedy span covers both objects and is not valid JSON.
        let raw = r#"{"relevance_score": 9} and also {"relevance_score": 2}"#;
        assert!(parse_judgment(raw).is_err());
    }

    #[test]
    fn test_nested_braces_inside_span() {
        let raw = r#"Result: {"relevance_score": 7, "summary": "Uses {braces}", "reasoning": "ok", "meta": {"k": 1}}."#;
        let j = parse_judgment(raw).unwrap();
        assert_eq!(j.relevance_score, 7);
        assert_eq!(j.summary, "Uses {braces}");
    }

    #[test]
    fn test_lenient_score_forms() {
        assert_eq!(parse_judgment(r#"{"relevance_score": "8"}"#).unwrap().relevance_score, 8);
        assert_eq!(parse_judgment(r#"{"relevance_score": 10.0}"#).unwrap().relevance_score, 10);
        assert!(parse_judgment(r#"{"relevance_score": 7.5}"#).is_err());
    }

    #[test]
    fn test_float_beyond_i64_is_unusable() {
        assert!(parse_judgment(r#"{"relevance_score": 1e20}"#).is_err());
        assert!(parse_judgment(r#"{"relevance_score": -1e20}"#).is_err());
        assert!(parse_judgment(r#"{"relevance_score": 18446744073709551615}"#).is_err());
        assert_eq!(parse_judgment(r#"{"relevance_score": 1e3}"#).unwrap().relevance_score, 1000);
    }

    #[test]
    fn test_out_of_range_score_is_kept() {
        assert_eq!(parse_judgment(r#"{"relevance_score": 42}"#).unwrap().relevance_score, 42);
        assert_eq!(parse_judgment(r#"{"relevance_score": -1}"#).unwrap().relevance_score, -1);
    }

    #[test]
    fn test_placeholders_for_missing_text() {
        let j = parse_judgment(r#"{"relevance_score": 8, "summary": "  "}"#).unwrap();
        assert_eq!(j.summary, MISSING_SUMMARY);
        assert_eq!(j.reasoning, MISSING_REASONING);
    }
}
