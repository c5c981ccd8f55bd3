//! Error body shapes returned by the Shopfront API

use serde::{Deserialize, Serialize};

/// Error response body
///
/// The API is not consistent about which field carries the human-readable
/// text, so both are optional.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Best message to show for a failed response body
    pub fn extract_message(body: &str) -> Option<String> {
        let parsed: Self = serde_json::from_str(body).ok()?;
        parsed.message.or(parsed.error).filter(|m| !m.is_empty())
    }
}
