use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body the image service attaches to non-2xx responses.
///
/// `detail` is usually a string, but validation failures carry a list of
/// field errors, so it is kept as raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            detail: Some(Value::String(message.into())),
        }
    }

    /// Human-readable message, if the body carried a non-empty one.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            other => Some(other.to_string()),
        }
    }
}
