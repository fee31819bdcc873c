//! HTTP request builder for upstream calls.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;

use crate::auth::SharedAuth;
use crate::error::TranslateResult;
use super::http::HttpRequest;

/// Builder for constructing authenticated JSON requests.
#[derive(Clone)]
pub struct RequestBuilder {
    auth_manager: SharedAuth,
}

impl RequestBuilder {
    /// Creates a new request builder.
    pub fn new(auth_manager: SharedAuth) -> Self {
        Self { auth_manager }
    }

    /// Builds a JSON POST request to `url`.
    ///
    /// `accept` overrides the default `application/json` accept header, e.g.
    /// `text/event-stream` for SSE endpoints.
    pub fn post_json<T: Serialize>(
        &self,
        url: &str,
        body: &T,
        accept: Option<&str>,
    ) -> TranslateResult<HttpRequest> {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert(
            "accept".to_string(),
            accept.unwrap_or("application/json").to_string(),
        );

        if let Some((name, value)) = self.auth_manager.get_auth_header() {
            headers.insert(name, value);
        }

        let body = serde_json::to_vec(body)?;

        Ok(HttpRequest::post(url, headers, Bytes::from(body)))
    }
}
