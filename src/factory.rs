//! Adapter construction from a validated [`ProviderConfig`].

use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::adapters::{
    GeminiOpenAiCompatibleAdapter, NativeGeminiAdapter, OpenAiCompatibleAdapter, TranslationAdapter,
};
use crate::config::{Provider, ProviderConfig, TEMPERATURE_RANGE};
use crate::error::{ConfigurationError, TranslateError, TranslateResult};
use crate::streaming::{ChunkSimulator, DEFAULT_REAL_STREAM_THRESHOLD};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Checks every field of a provider configuration.
///
/// Runs before any adapter is built or any request is sent. Checks are made
/// in a fixed order and the first failure is returned.
pub fn validate_provider_config(config: &ProviderConfig) -> TranslateResult<()> {
    let provider = config.provider.trim();
    if provider.is_empty() {
        return Err(ConfigurationError::MissingProvider.into());
    }
    if provider.parse::<Provider>().is_err() {
        return Err(ConfigurationError::UnknownProvider {
            provider: config.provider.clone(),
        }
        .into());
    }

    let adapter = &config.adapter;
    if adapter.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigurationError::MissingApiKey.into());
    }

    let base_url = adapter.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigurationError::MissingBaseUrl.into());
    }
    if Url::parse(base_url).is_err() {
        return Err(ConfigurationError::InvalidBaseUrl {
            url: adapter.base_url.clone(),
        }
        .into());
    }

    if adapter.model.trim().is_empty() {
        return Err(ConfigurationError::MissingModel.into());
    }
    if adapter.max_tokens == 0 {
        return Err(ConfigurationError::InvalidMaxTokens {
            value: adapter.max_tokens,
        }
        .into());
    }
    if !TEMPERATURE_RANGE.contains(&adapter.temperature) {
        return Err(ConfigurationError::InvalidTemperature {
            value: adapter.temperature,
        }
        .into());
    }

    Ok(())
}

/// Routing hint for Gemini when the caller did not choose a surface.
///
/// Base URLs already pointing at the `/openai` surface, and Google's own host
/// (which serves both surfaces), route to the OpenAI-compatible adapter.
/// Anything else does too; pass `use_openai_compatible: false` to force the
/// native API.
pub fn should_use_openai_compatible(base_url: &str) -> bool {
    let hinted = Url::parse(base_url.trim()).is_ok_and(|url| {
        url.path().trim_end_matches('/').ends_with("/openai")
            || url.host_str() == Some("generativelanguage.googleapis.com")
    });

    if !hinted {
        tracing::debug!(base_url = %base_url, "No Gemini surface hint in base URL; using OpenAI-compatible");
    }

    true
}

/// Builds adapters.
///
/// Holds the pieces shared by the adapters it creates: an optional injected
/// transport (a [`ReqwestTransport`] is built per adapter otherwise), the
/// simulator and the reality threshold.
#[derive(Clone)]
pub struct AdapterFactory {
    transport: Option<Arc<dyn HttpTransport>>,
    simulator: Arc<ChunkSimulator>,
    real_stream_threshold: Duration,
}

impl Default for AdapterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterFactory {
    /// Factory with production defaults.
    pub fn new() -> Self {
        Self {
            transport: None,
            simulator: Arc::new(ChunkSimulator::default()),
            real_stream_threshold: DEFAULT_REAL_STREAM_THRESHOLD,
        }
    }

    /// Uses `transport` for every adapter.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses `simulator` for atomic payloads.
    pub fn with_simulator(mut self, simulator: Arc<ChunkSimulator>) -> Self {
        self.simulator = simulator;
        self
    }

    /// Sets the reality-detection threshold.
    pub fn with_real_stream_threshold(mut self, threshold: Duration) -> Self {
        self.real_stream_threshold = threshold;
        self
    }

    /// Validates `config` and builds the matching adapter.
    ///
    /// An unrecognised provider name fails with `UnsupportedProvider`;
    /// every other problem is a configuration error.
    pub fn create_adapter(&self, config: &ProviderConfig) -> TranslateResult<Arc<dyn TranslationAdapter>> {
        if config.provider.trim().is_empty() {
            return Err(ConfigurationError::MissingProvider.into());
        }
        let provider: Provider = config.provider.parse()?;
        validate_provider_config(config)?;

        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(ReqwestTransport::from_config(&config.adapter).map_err(TranslateError::from)?),
        };

        let adapter: Arc<dyn TranslationAdapter> = match provider {
            Provider::OpenAi => Arc::new(OpenAiCompatibleAdapter::new(config.adapter.clone(), transport)?),
            Provider::Gemini => {
                let compatible = config
                    .use_openai_compatible
                    .unwrap_or_else(|| should_use_openai_compatible(&config.adapter.base_url));

                if compatible {
                    Arc::new(
                        GeminiOpenAiCompatibleAdapter::new(config.adapter.clone(), transport)?
                            .with_simulator(Arc::clone(&self.simulator))
                            .with_real_stream_threshold(self.real_stream_threshold),
                    )
                } else {
                    Arc::new(
                        NativeGeminiAdapter::new(config.adapter.clone(), transport)?
                            .with_simulator(Arc::clone(&self.simulator)),
                    )
                }
            }
        };

        tracing::debug!(
            provider = %provider,
            adapter = %adapter.kind(),
            model = %config.adapter.model,
            "Created translation adapter"
        );

        Ok(adapter)
    }
}
