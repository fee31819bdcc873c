//! Reqwest-based HTTP transport implementation.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::error::TransportError;
use super::http::{ChunkedStream, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::config::AdapterConfig;

const USER_AGENT: &str = concat!("integrations-translation/", env!("CARGO_PKG_VERSION"));

/// Reqwest-based HTTP transport.
///
/// `timeout` bounds a whole buffered exchange. For streaming requests it only
/// bounds the wait for the response head; a body may then stream for as long
/// as the upstream keeps it open.
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a new reqwest transport with the given timeouts.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Connection(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Create a transport using the timeouts of an adapter configuration.
    pub fn from_config(config: &AdapterConfig) -> Result<Self, TransportError> {
        Self::new(config.timeout(), config.connect_timeout())
    }

    fn request_builder(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = match request.method {
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => debug!(header = %name, "Dropping header that is not valid HTTP"),
            }
        }

        let builder = self.client.request(method, &request.url).headers(headers);
        match request.body {
            Some(body) => builder.body(body),
            None => builder,
        }
    }

    fn map_send_error(e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connection(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }

    fn response_headers(headers: &HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self
            .request_builder(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::map_send_error(&e))?;

        let status = response.status().as_u16();
        let headers = Self::response_headers(response.headers());
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Request(format!("Failed to read response body: {e}"))
            }
        })?;

        debug!(status, bytes = body.len(), "Received buffered response");
        Ok(HttpResponse { status, headers, body })
    }

    async fn send_streaming(&self, request: HttpRequest) -> Result<ChunkedStream, TransportError> {
        let pending = self.request_builder(request).send();
        let response = tokio::time::timeout(self.timeout, pending)
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(|e| Self::map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = tokio::time::timeout(self.timeout, response.bytes())
                .await
                .map_err(|_| TransportError::Timeout)?
                .map_err(|e| TransportError::Request(format!("Failed to read error response: {e}")))?;
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Streaming response opened");
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::Request(format!("Stream error: {e}"))));

        Ok(Box::pin(stream))
    }
}
