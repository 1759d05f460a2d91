use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;

const EXCERPT_CHARS: usize = 120;

/// A model reply that could not be read as the JSON we asked for.
#[derive(Debug, thiserror::Error)]
#[error("malformed model response: {reason} (near `{excerpt}`)")]
pub struct MalformedModelResponse {
    pub reason: String,
    pub excerpt: String,
}

/// Removes markdown code fences the models like to wrap JSON in.
pub fn strip_code_fences(content: &str) -> String {
    lazy_static! {
        static ref FENCE_RE: Regex = Regex::new(r"```json\n?|\n?```").unwrap();
    }
    FENCE_RE.replace_all(content, "").trim().to_string()
}

/// Fence-strips and parses a model reply into `T`.
pub fn decode_model_json<T: DeserializeOwned>(content: &str) -> Result<T, MalformedModelResponse> {
    let clean = strip_code_fences(content);
    serde_json::from_str(&clean).map_err(|e| MalformedModelResponse {
        reason: e.to_string(),
        excerpt: clean.chars().take(EXCERPT_CHARS).collect(),
    })
}
