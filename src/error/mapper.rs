//! Error mapping utilities for upstream error bodies.

use serde::Deserialize;

use super::TranslateError;

/// Error envelope shared by OpenAI-compatible and Google APIs.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Detailed error information from an upstream API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Google sends the HTTP status here; OpenAI-style APIs send a string code.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ApiErrorDetail {
    /// Best available description: message, then status, then type.
    pub fn describe(&self) -> Option<String> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.status.as_deref())
            .or(self.kind.as_deref())
            .map(str::to_string)
    }

    /// HTTP status carried in a numeric `code`, if it is an error status.
    pub fn http_status(&self) -> Option<u16> {
        self.code
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .filter(|code| (400..600).contains(code))
    }

    /// Converts an error object received inside a successful stream.
    pub fn into_stream_error(self) -> TranslateError {
        let message = self
            .describe()
            .unwrap_or_else(|| "upstream sent an error object".to_string());
        match self.http_status() {
            Some(status) => TranslateError::UpstreamHttp { status, message },
            None => TranslateError::UpstreamStream { message },
        }
    }
}

/// Extracts a human-readable message from an upstream error body.
///
/// Understands `{"error":{"message":...}}` as well as the Google variant that
/// wraps the envelope in a single-element array. Falls back to the raw text.
pub fn extract_error_message(body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ApiErrorResponse>(body) {
        if let Some(message) = envelope.error.describe() {
            return message;
        }
    }

    if let Ok(list) = serde_json::from_slice::<Vec<ApiErrorResponse>>(body) {
        if let Some(message) = list.into_iter().find_map(|e| e.error.message) {
            return message;
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        "empty response body".to_string()
    } else {
        text
    }
}
