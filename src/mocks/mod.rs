//! Mock implementations for testing.
//!
//! [`MockHttpTransport`] replays scripted responses so adapters and the
//! stream processor can be exercised without a network. Streaming scripts can
//! space their chunks in (virtual) time, fail part-way, or stall forever, and
//! the mock counts how many streaming bodies were released.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::transport::{ChunkedStream, HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted streaming body.
struct StreamScript {
    items: Vec<(Duration, Result<Bytes, TransportError>)>,
    stall: bool,
}

/// Increments the closed counter when the body it lives in is dropped.
struct CloseGuard(Arc<AtomicUsize>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock HTTP transport for testing.
///
/// Responses are returned in the order they were enqueued; requests are
/// recorded for later assertions.
///
/// # Example
///
/// ```
/// use integrations_translation::mocks::MockHttpTransport;
/// use integrations_translation::transport::{HttpMethod, HttpRequest, HttpTransport};
/// use std::collections::HashMap;
///
/// # #[tokio::main]
/// # async fn main() {
/// let transport = MockHttpTransport::new();
/// transport.enqueue_json_response(200, r#"{"status": "ok"}"#);
///
/// let request = HttpRequest {
///     method: HttpMethod::Post,
///     url: "https://example.com".to_string(),
///     headers: HashMap::new(),
///     body: None,
/// };
///
/// let response = transport.send(request).await.unwrap();
/// assert_eq!(response.status, 200);
/// transport.verify_request_count(1);
/// # }
/// ```
pub struct MockHttpTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    streaming_responses: Mutex<VecDeque<Result<StreamScript, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    closed_streams: Arc<AtomicUsize>,
}

impl MockHttpTransport {
    /// Create a new mock HTTP transport.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            streaming_responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            closed_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Enqueue a response to be returned by the next buffered request.
    pub fn enqueue_response(&self, response: Result<HttpResponse, TransportError>) {
        lock(&self.responses).push_back(response);
    }

    /// Enqueue a JSON response with the given status code and body.
    pub fn enqueue_json_response(&self, status: u16, body: &str) {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        self.enqueue_response(Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }));
    }

    /// Enqueue a transport error for the next buffered request.
    pub fn enqueue_error(&self, error: TransportError) {
        self.enqueue_response(Err(error));
    }

    /// Enqueue a streaming body delivered without delays.
    pub fn enqueue_streaming_response(&self, chunks: Vec<Bytes>) {
        self.enqueue_timed_streaming_response(chunks.into_iter().map(|c| (Duration::ZERO, c)).collect());
    }

    /// Enqueue a streaming body; each chunk is preceded by its delay.
    pub fn enqueue_timed_streaming_response(&self, chunks: Vec<(Duration, Bytes)>) {
        self.push_script(chunks, None, false);
    }

    /// Enqueue a streaming body that never ends after its last chunk.
    pub fn enqueue_stalled_streaming_response(&self, chunks: Vec<(Duration, Bytes)>) {
        self.push_script(chunks, None, true);
    }

    /// Enqueue a streaming body that fails with `error` after its chunks.
    pub fn enqueue_interrupted_streaming_response(&self, chunks: Vec<Bytes>, error: TransportError) {
        self.push_script(
            chunks.into_iter().map(|c| (Duration::ZERO, c)).collect(),
            Some(error),
            false,
        );
    }

    /// Enqueue a failure for the next streaming request.
    pub fn enqueue_streaming_error(&self, error: TransportError) {
        lock(&self.streaming_responses).push_back(Err(error));
    }

    /// Enqueue a non-2xx status for the next streaming request.
    pub fn enqueue_streaming_status(&self, status: u16, body: &str) {
        self.enqueue_streaming_error(TransportError::Status {
            status,
            body: Bytes::from(body.to_string()),
        });
    }

    fn push_script(&self, chunks: Vec<(Duration, Bytes)>, error: Option<TransportError>, stall: bool) {
        let mut items: Vec<_> = chunks.into_iter().map(|(d, c)| (d, Ok(c))).collect();
        if let Some(error) = error {
            items.push((Duration::ZERO, Err(error)));
        }
        lock(&self.streaming_responses).push_back(Ok(StreamScript { items, stall }));
    }

    /// Get all requests that were made.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Get the last request that was made.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Body of the last request decoded as JSON.
    pub fn last_request_json(&self) -> Option<serde_json::Value> {
        self.last_request()
            .and_then(|r| r.body)
            .and_then(|body| serde_json::from_slice(&body).ok())
    }

    /// Number of streaming bodies that were dropped or ran to completion.
    pub fn closed_streams(&self) -> usize {
        self.closed_streams.load(Ordering::SeqCst)
    }

    /// Verify that exactly `expected` requests were made.
    pub fn verify_request_count(&self, expected: usize) {
        let actual = lock(&self.requests).len();
        assert_eq!(actual, expected, "Expected {expected} requests, got {actual}");
    }

    /// Verify that a request was made with the expected method and URL.
    pub fn verify_request(&self, index: usize, method: HttpMethod, url_contains: &str) {
        let requests = lock(&self.requests);
        assert!(index < requests.len(), "No request at index {index}");

        let request = &requests[index];
        assert_eq!(request.method, method, "Expected method {:?}, got {:?}", method, request.method);
        assert!(
            request.url.contains(url_contains),
            "Expected URL to contain '{}', got '{}'",
            url_contains,
            request.url
        );
    }

    /// Verify that a request carries a specific header.
    pub fn verify_header(&self, index: usize, header_name: &str, header_value: &str) {
        let requests = lock(&self.requests);
        assert!(index < requests.len(), "No request at index {index}");

        let actual_value = requests[index].headers.get(header_name);
        assert_eq!(
            actual_value.map(String::as_str),
            Some(header_value),
            "Expected header '{header_name}' to be '{header_value}'"
        );
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request);

        lock(&self.responses).pop_front().unwrap_or_else(|| {
            Err(TransportError::Connection(
                "No response configured in MockHttpTransport".to_string(),
            ))
        })
    }

    async fn send_streaming(&self, request: HttpRequest) -> Result<ChunkedStream, TransportError> {
        lock(&self.requests).push(request);

        let script = lock(&self.streaming_responses).pop_front().unwrap_or_else(|| {
            Err(TransportError::Connection(
                "No streaming response configured in MockHttpTransport".to_string(),
            ))
        })?;

        let guard = CloseGuard(Arc::clone(&self.closed_streams));
        let stream = async_stream::stream! {
            let _guard = guard;
            for (delay, item) in script.items {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield item;
            }
            if script.stall {
                futures::future::pending::<()>().await;
            }
        };

        Ok(Box::pin(stream))
    }
}
