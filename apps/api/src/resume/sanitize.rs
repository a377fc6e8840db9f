//! Response Sanitizer: turns a raw model completion into strict JSON.

use serde_json::Value;
use thiserror::Error;

/// The completion was not valid JSON after fence stripping.
/// Carries the untouched completion so callers can log it or pass it through.
#[derive(Debug, Error)]
#[error("completion is not valid JSON: {source}")]
pub struct MalformedCompletion {
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Strips a leading ```` ``` ```` / ```` ```json ```` fence and a trailing ```` ``` ````,
/// tolerating either being absent, and trims whitespace around both.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let body = match text.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.trim_start_matches([' ', '\t']);
            let tag_len = rest
                .get(..4)
                .filter(|tag| tag.eq_ignore_ascii_case("json"))
                .map_or(0, str::len);
            &rest[tag_len..]
        }
        None => text,
    };
    let body = body.trim();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Strips fences and parses strictly. Never falls back to returning the raw text.
pub fn sanitize_completion(raw: &str) -> Result<Value, MalformedCompletion> {
    serde_json::from_str(strip_code_fences(raw)).map_err(|source| MalformedCompletion {
        raw: raw.to_string(),
        source,
    })
}
