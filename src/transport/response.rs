//! HTTP response parser for upstream calls.

use serde::de::DeserializeOwned;

use crate::error::{extract_error_message, TranslateError};
use super::http::HttpResponse;

/// Parser for buffered HTTP responses.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a successful HTTP response into the expected type.
    ///
    /// Non-2xx statuses become `UpstreamHttp`; bodies that do not decode
    /// become `UpstreamFormat`.
    pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, TranslateError> {
        if response.is_success() {
            serde_json::from_slice(&response.body).map_err(|e| TranslateError::UpstreamFormat {
                message: format!("{}: {}", e, String::from_utf8_lossy(&response.body)),
            })
        } else {
            Err(Self::parse_error_response(&response))
        }
    }

    /// Maps an error response to `TranslateError::UpstreamHttp`.
    pub fn parse_error_response(response: &HttpResponse) -> TranslateError {
        let message = extract_error_message(&response.body);

        if let Some(id) = response.header("x-request-id") {
            tracing::debug!(request_id = %id, status = response.status, "Upstream error response");
        }

        TranslateError::UpstreamHttp {
            status: response.status,
            message,
        }
    }
}
