//! Authentication for upstream provider APIs.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Authentication manager for an upstream API.
pub trait AuthManager: Send + Sync {
    /// Get the authentication header name and value.
    fn get_auth_header(&self) -> Option<(String, String)>;
}

/// `Authorization: Bearer` authentication used by OpenAI-compatible APIs.
pub struct BearerAuthManager {
    api_key: SecretString,
}

impl BearerAuthManager {
    /// Create a new bearer auth manager.
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }
}

impl AuthManager for BearerAuthManager {
    fn get_auth_header(&self) -> Option<(String, String)> {
        Some((
            "authorization".to_string(),
            format!("Bearer {}", self.api_key.expose_secret()),
        ))
    }
}

/// `x-goog-api-key` header authentication used by the native Gemini API.
pub struct GoogleApiKeyAuthManager {
    api_key: SecretString,
}

impl GoogleApiKeyAuthManager {
    /// Create a new Google API key auth manager.
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }
}

impl AuthManager for GoogleApiKeyAuthManager {
    fn get_auth_header(&self) -> Option<(String, String)> {
        Some((
            "x-goog-api-key".to_string(),
            self.api_key.expose_secret().to_string(),
        ))
    }
}

/// Shared handle to an auth manager.
pub type SharedAuth = Arc<dyn AuthManager>;
