//! Data API wire envelopes.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use jotter_core::RawPage;

/// Envelope of every paginated list response.
#[derive(Debug, Deserialize)]
pub struct PageEnvelope {
    pub items: Vec<JsonValue>,
    pub has_more: bool,
    #[serde(default)]
    pub total: Option<u64>,
}

impl From<PageEnvelope> for RawPage {
    fn from(envelope: PageEnvelope) -> Self {
        RawPage {
            items: envelope.items,
            has_more: envelope.has_more,
            total: envelope.total,
        }
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Extract a readable message from an error response body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => "no details".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
