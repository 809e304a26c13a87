//! Raw model payload shapes and the trial-parse that tells them apart.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AnalyzeError, AnalyzeResult};

/// One issue object as the model sends it. Every field is optional here;
/// the normalizer decides what is required.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RawIssue {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<RawSource>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RawSource {
    #[serde(rename = "type", default)]
    pub source_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// The two payload shapes the pipeline accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    Structured(Vec<RawIssue>),
    PlainText(String),
}

/// Pull the body out of a markdown code fence (```` ``` ```` or ```` ```json ````).
///
/// A fence that opens the payload is always unwrapped. A fence after some
/// preamble is unwrapped only when its body looks like JSON; otherwise the
/// whole trimmed payload is returned.
pub fn strip_code_fence(payload: &str) -> &str {
    let s = payload.trim();
    let Some(open) = s.find("```") else {
        return s;
    };
    let rest = &s[open + 3..];
    // Drop the info string ("json", "JSON", ...) on the opening line.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
    .trim();

    if open == 0 || looks_like_json(body) {
        body
    } else {
        s
    }
}

/// Opens like a JSON object or an array of issues.
fn looks_like_json(text: &str) -> bool {
    if text.starts_with('{') {
        return true;
    }
    match text.strip_prefix('[') {
        Some(rest) => matches!(rest.trim_start().chars().next(), None | Some('{' | '"' | ']')),
        None => false,
    }
}

/// Decide which shape a payload has.
///
/// JSON is tried first. Text that merely starts like JSON but does not parse
/// is a format error; anything else that is not JSON is plain text.
pub fn detect(payload: &str) -> AnalyzeResult<RawResponse> {
    let text = strip_code_fence(payload);
    if text.is_empty() {
        return Err(AnalyzeError::Format("empty model response".into()));
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) if looks_like_json(text) => {
            return Err(AnalyzeError::Format(format!("malformed JSON payload: {e}")));
        }
        Err(_) => return Ok(RawResponse::PlainText(text.to_string())),
    };

    match value {
        Value::Array(items) => structured_from(items),
        Value::Object(mut map) => {
            if let Some(err) = map.remove("error").filter(|v| !v.is_null()) {
                let msg = match err {
                    Value::String(s) => s,
                    other => other
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| other.to_string()),
                };
                return Err(AnalyzeError::Upstream(msg));
            }
            match map.remove("issues") {
                Some(Value::Array(items)) => structured_from(items),
                Some(Value::String(s)) => Ok(RawResponse::PlainText(s)),
                _ => Err(AnalyzeError::Format(
                    "JSON object without an issues list".into(),
                )),
            }
        }
        Value::String(s) => Ok(RawResponse::PlainText(s)),
        _ => Ok(RawResponse::PlainText(text.to_string())),
    }
}

fn structured_from(items: Vec<Value>) -> AnalyzeResult<RawResponse> {
    if let Some(pos) = items.iter().position(|v| !v.is_object()) {
        return Err(AnalyzeError::Format(format!(
            "issue #{} is not a JSON object",
            pos + 1
        )));
    }
    let issues: Vec<RawIssue> = serde_json::from_value(Value::Array(items))
        .map_err(|e| AnalyzeError::Format(format!("malformed issue object: {e}")))?;
    Ok(RawResponse::Structured(issues))
}
