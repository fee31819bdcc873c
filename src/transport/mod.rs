//! HTTP transport layer for upstream provider calls.

mod http;
mod error;
mod reqwest;
pub mod endpoints;
mod request;
mod response;
pub mod sse;

pub use http::{HttpTransport, HttpMethod, HttpRequest, HttpResponse, ChunkedStream};
pub use error::TransportError;
pub use reqwest::ReqwestTransport;
pub use request::RequestBuilder;
pub use response::ResponseParser;
pub use sse::{SseEvent, SseStream};
