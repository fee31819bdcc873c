//! Transport layer error types.

use bytes::Bytes;

/// Transport error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Timeout")]
    Timeout,
    #[error("Request error: {0}")]
    Request(String),
    #[error("HTTP error {status}")]
    Status { status: u16, body: Bytes },
}
