//! Configuration types for the translation adapters.

use secrecy::SecretString;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigurationError, TranslateError};

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default Gemini base URL (OpenAI-compatible surface).
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default maximum number of tokens to generate.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Accepted sampling temperatures, bounds included.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Default request timeout (120 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Upstream provider family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    /// OpenAI or any OpenAI-compatible chat-completions API.
    OpenAi,
    /// Google Gemini (native or OpenAI-compatible surface).
    Gemini,
}

impl Provider {
    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// Returns the default base URL for this provider.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => DEFAULT_OPENAI_BASE_URL,
            Provider::Gemini => DEFAULT_GEMINI_BASE_URL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            _ => Err(TranslateError::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Configuration owned by a single adapter instance.
///
/// Immutable once the adapter is constructed.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    /// API key (required).
    pub api_key: SecretString,
    /// Base URL of the upstream API.
    #[serde(rename = "baseURL", alias = "baseUrl")]
    pub base_url: String,
    /// Default model name.
    pub model: String,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature, within `0.0..=2.0`.
    pub temperature: f32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl AdapterConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Per-request provider selection plus adapter configuration.
///
/// Built by the caller, consumed once by the adapter factory, then discarded.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Provider name (`openai` or `gemini`).
    #[serde(default)]
    pub provider: String,
    /// For Gemini: use the OpenAI-compatible surface unless explicitly `false`.
    #[serde(default, rename = "useOpenAICompatible", alias = "useOpenAiCompatible")]
    pub use_openai_compatible: Option<bool>,
    /// Adapter configuration.
    #[serde(flatten)]
    pub adapter: AdapterConfig,
}

impl ProviderConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    ///
    /// Only the provider is required here; everything else is checked by the
    /// factory before an adapter is built.
    pub fn from_env() -> Result<Self, TranslateError> {
        let provider = std::env::var("TRANSLATE_PROVIDER")
            .map_err(|_| ConfigurationError::MissingProvider)?;

        let api_key = std::env::var("TRANSLATE_API_KEY")
            .map_err(|_| ConfigurationError::MissingApiKey)?;

        let mut builder = Self::builder()
            .provider(&provider)
            .api_key(SecretString::new(api_key));

        if let Ok(base_url) = std::env::var("TRANSLATE_BASE_URL") {
            builder = builder.base_url(&base_url);
        } else if let Ok(parsed) = provider.parse::<Provider>() {
            builder = builder.base_url(parsed.default_base_url());
        }

        if let Ok(model) = std::env::var("TRANSLATE_MODEL") {
            builder = builder.model(&model);
        }

        if let Some(max_tokens) = std::env::var("TRANSLATE_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            builder = builder.max_tokens(max_tokens);
        }

        if let Some(temperature) = std::env::var("TRANSLATE_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            builder = builder.temperature(temperature);
        }

        if let Some(flag) = std::env::var("TRANSLATE_USE_OPENAI_COMPATIBLE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            builder = builder.use_openai_compatible(flag);
        }

        if let Some(secs) = std::env::var("TRANSLATE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(builder.build())
    }
}

/// Builder for `ProviderConfig`.
#[derive(Default)]
pub struct ProviderConfigBuilder {
    provider: Option<String>,
    use_openai_compatible: Option<bool>,
    api_key: Option<SecretString>,
    base_url: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ProviderConfigBuilder {
    /// Set the provider name.
    pub fn provider(mut self, provider: &str) -> Self {
        self.provider = Some(provider.to_string());
        self
    }

    /// Choose the Gemini surface explicitly.
    pub fn use_openai_compatible(mut self, flag: bool) -> Self {
        self.use_openai_compatible = Some(flag);
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// Set the model.
    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Set the maximum number of tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    ///
    /// Does not validate; `AdapterFactory` rejects invalid values before
    /// constructing an adapter.
    pub fn build(self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.unwrap_or_default(),
            use_openai_compatible: self.use_openai_compatible,
            adapter: AdapterConfig {
                api_key: self.api_key.unwrap_or_else(|| SecretString::new(String::new())),
                base_url: self.base_url.unwrap_or_default(),
                model: self.model.unwrap_or_default(),
                max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                timeout_secs: self.timeout.map_or(DEFAULT_TIMEOUT_SECS, |t| t.as_secs()),
                connect_timeout_secs: self
                    .connect_timeout
                    .map_or(DEFAULT_CONNECT_TIMEOUT_SECS, |t| t.as_secs()),
            },
        }
    }
}
