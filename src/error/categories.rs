//! Error category types for granular error handling.

use std::time::Duration;
use thiserror::Error;

/// Configuration-related errors.
///
/// Raised synchronously before any adapter is constructed or any network call is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Missing provider")]
    MissingProvider,

    #[error("Unsupported provider: {provider}")]
    UnknownProvider { provider: String },

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Missing base URL")]
    MissingBaseUrl,

    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Missing model")]
    MissingModel,

    #[error("Invalid max tokens: {value} (must be positive)")]
    InvalidMaxTokens { value: u32 },

    #[error("Invalid temperature: {value} (must be within 0..=2)")]
    InvalidTemperature { value: f32 },
}

/// Network-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Stream interrupted: {message}")]
    StreamInterrupted { message: String },
}
