//! Main error type for the translation adapters.

use std::time::Duration;
use thiserror::Error;
use super::categories::*;
use super::mapper::extract_error_message;
use crate::transport::TransportError;

/// Result type alias for translation operations.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Top-level error type for the translation adapter layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Upstream returned HTTP {status}: {message}")]
    UpstreamHttp { status: u16, message: String },

    #[error("Upstream reported an error mid-stream: {message}")]
    UpstreamStream { message: String },

    #[error("Unexpected upstream response format: {message}")]
    UpstreamFormat { message: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Stream aborted by consumer")]
    Aborted,
}

impl TranslateError {
    /// Returns true if this error represents consumer-initiated cancellation.
    pub fn is_abort(&self) -> bool {
        matches!(self, TranslateError::Aborted)
    }

    /// Returns the upstream HTTP status, if the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TranslateError::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for TranslateError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status, body } => TranslateError::UpstreamHttp {
                status,
                message: extract_error_message(&body),
            },
            TransportError::Timeout => TranslateError::Network(NetworkError::Timeout {
                duration: Duration::from_secs(0), // Unknown actual duration
            }),
            TransportError::Connection(message) => {
                TranslateError::Network(NetworkError::ConnectionFailed { message })
            }
            TransportError::Request(message) => {
                TranslateError::Network(NetworkError::StreamInterrupted { message })
            }
        }
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(err: serde_json::Error) -> Self {
        TranslateError::UpstreamFormat {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for TranslateError {
    fn from(err: url::ParseError) -> Self {
        TranslateError::Configuration(ConfigurationError::InvalidBaseUrl {
            url: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_status_error_maps_to_upstream_http() {
        let err: TranslateError = TransportError::Status {
            status: 429,
            body: Bytes::from(r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#),
        }
        .into();

        assert_eq!(
            err,
            TranslateError::UpstreamHttp {
                status: 429,
                message: "Rate limit reached".to_string(),
            }
        );
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_is_abort() {
        assert!(TranslateError::Aborted.is_abort());
        assert!(!TranslateError::InvalidRequest { message: "x".into() }.is_abort());
    }

    #[test]
    fn test_timeout_maps_to_network() {
        let err: TranslateError = TransportError::Timeout.into();
        assert!(matches!(err, TranslateError::Network(NetworkError::Timeout { .. })));
    }
}
