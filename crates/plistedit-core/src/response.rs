//! Interpretation of the repository's save endpoint responses.
//!
//! The endpoint answers a successful write with arbitrary content (usually
//! rendered HTML or the stored record). Failures come back as a JSON envelope
//! `{"result": "failed", "detail": "..."}`.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The write went through; carries the response body.
    Saved(String),
    Failed { detail: String },
}

#[derive(Deserialize)]
struct Envelope {
    result: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl SaveOutcome {
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Envelope>(body) {
            Ok(Envelope {
                result: Some(result),
                detail,
            }) if result == "failed" => SaveOutcome::Failed {
                detail: match detail {
                    Some(serde_json::Value::String(text)) => text,
                    Some(other) => other.to_string(),
                    None => String::new(),
                },
            },
            _ => SaveOutcome::Saved(body.to_string()),
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}
