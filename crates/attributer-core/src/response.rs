//! ResponseSet and the "JSON object inside free text" extraction step.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FormatError;

/// Keys the model must return, in display order.
pub const RESPONSE_KEYS: [&str; 4] = ["version1", "version2", "version3", "recommendation"];

/// Three alternative-length answers plus a usage recommendation for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSet {
    pub version1: String,
    pub version2: String,
    pub version3: String,
    pub recommendation: String,
}

/// A question paired with its ResponseSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    pub response: ResponseSet,
}

/// Span from the first `{` to the last `}` (inclusive), if any.
fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn required_field(obj: &Map<String, Value>, key: &'static str) -> Result<String, FormatError> {
    match obj.get(key) {
        None => Err(FormatError::MissingKey(key)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(FormatError::EmptyField(key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(FormatError::NotAString(key)),
    }
}

/// Extract a ResponseSet from free-form model output.
///
/// Takes the text between the first `{` and the last `}`, parses it as JSON and requires
/// all four keys to be present, string-typed and non-blank. Anything else is a
/// [`FormatError`]; there is no partial recovery.
pub fn extract_response_set(text: &str) -> Result<ResponseSet, FormatError> {
    let span = json_span(text).ok_or(FormatError::NoJson)?;
    let value: Value =
        serde_json::from_str(span).map_err(|e| FormatError::InvalidJson(e.to_string()))?;
    let obj = value.as_object().ok_or(FormatError::NotAnObject)?;

    let [k1, k2, k3, k4] = RESPONSE_KEYS;
    Ok(ResponseSet {
        version1: required_field(obj, k1)?,
        version2: required_field(obj, k2)?,
        version3: required_field(obj, k3)?,
        recommendation: required_field(obj, k4)?,
    })
}
