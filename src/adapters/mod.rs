//! Provider adapters.
//!
//! Every upstream surface is wrapped in a [`TranslationAdapter`] that turns a
//! [`TranslationRequest`] into either one response or a [`ChunkStream`]:
//!
//! - [`OpenAiCompatibleAdapter`]: SSE chat completions passed straight through
//! - [`NativeGeminiAdapter`]: `streamGenerateContent` with undelimited JSON objects
//! - [`GeminiOpenAiCompatibleAdapter`]: Gemini's OpenAI surface, with reality
//!   detection and simulated streaming for atomic payloads

mod chat;
mod gemini_native;
mod gemini_openai;
mod openai;
mod prompt;

pub use chat::{ChatCompletions, ChatDelta, DeltaStream};
pub use gemini_native::NativeGeminiAdapter;
pub use gemini_openai::GeminiOpenAiCompatibleAdapter;
pub use openai::OpenAiCompatibleAdapter;
pub use prompt::{build_translation_prompt, system_instruction, DEFAULT_TARGET_LANGUAGE};

use async_trait::async_trait;
use futures::Stream;
use secrecy::ExposeSecret;
use std::fmt;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use crate::config::{AdapterConfig, TEMPERATURE_RANGE};
use crate::error::{ConfigurationError, TranslateError, TranslateResult};
use crate::transport::{ChunkedStream, HttpRequest, HttpTransport};
use crate::types::{StreamChunk, TranslationRequest, TranslationResponse};

/// Ordered, finite sequence of chunks produced by one streaming call.
///
/// Pull-driven: nothing happens upstream while the consumer is not polling.
pub type ChunkStream = Pin<Box<dyn Stream<Item = TranslateResult<StreamChunk>> + Send>>;

/// Adapter variant, chosen once by the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    /// OpenAI chat completions (or any compatible API).
    OpenAiCompatible,
    /// Native Gemini `generateContent`.
    NativeGemini,
    /// Gemini's OpenAI-compatible surface.
    GeminiOpenAiCompatible,
}

impl AdapterKind {
    /// Stable name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::OpenAiCompatible => "openai_compatible",
            AdapterKind::NativeGemini => "native_gemini",
            AdapterKind::GeminiOpenAiCompatible => "gemini_openai_compatible",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract implemented by every provider adapter.
///
/// Adapters own their configuration and hold no per-call state, so one
/// instance may serve concurrent calls.
#[async_trait]
pub trait TranslationAdapter: Send + Sync {
    /// Which variant this is.
    fn kind(&self) -> AdapterKind;

    /// The configuration the adapter was built with.
    fn config(&self) -> &AdapterConfig;

    /// One round trip returning the full translation.
    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationResponse>;

    /// Starts a streaming translation.
    ///
    /// The returned stream ends with exactly one complete chunk unless it
    /// fails first; cancelling `cancel` aborts the upstream call.
    fn translate_stream(&self, request: TranslationRequest, cancel: CancellationToken) -> ChunkStream;

    /// Applies the default instruction template unless `system_message` is given.
    fn build_translation_prompt(
        &self,
        text: &str,
        system_message: Option<&str>,
        target_language: Option<&str>,
    ) -> String {
        build_translation_prompt(text, system_message, target_language)
    }

    /// Re-checks the configuration invariants established at construction.
    fn validate_config(&self) -> TranslateResult<()> {
        validate_adapter_config(self.config())
    }
}

/// Fails if the API key or base URL is empty.
pub fn validate_adapter_config(config: &AdapterConfig) -> TranslateResult<()> {
    if config.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigurationError::MissingApiKey.into());
    }
    if config.base_url.trim().is_empty() {
        return Err(ConfigurationError::MissingBaseUrl.into());
    }
    Ok(())
}

/// Per-call parameters after applying request overrides.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CallParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CallParams {
    /// Resolves overrides; rejects an empty text or an out-of-range
    /// temperature before any network call.
    pub(crate) fn resolve(config: &AdapterConfig, request: &TranslationRequest) -> TranslateResult<Self> {
        if request.text.trim().is_empty() {
            return Err(TranslateError::InvalidRequest {
                message: "text must not be empty".to_string(),
            });
        }

        let model = if request.model.trim().is_empty() {
            config.model.clone()
        } else {
            request.model.clone()
        };
        let max_tokens = if request.max_tokens == 0 {
            config.max_tokens
        } else {
            request.max_tokens
        };

        let temperature = request.temperature.unwrap_or(config.temperature);
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(TranslateError::InvalidRequest {
                message: format!("temperature must be between 0 and 2, got {temperature}"),
            });
        }

        Ok(Self {
            model,
            max_tokens,
            temperature,
        })
    }
}

/// Sends a streaming request, giving up as soon as `cancel` fires.
pub(crate) async fn open_stream(
    transport: &dyn HttpTransport,
    request: HttpRequest,
    cancel: &CancellationToken,
) -> TranslateResult<ChunkedStream> {
    let url = request.url.clone();

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(TranslateError::Aborted),
        result = transport.send_streaming(request) => result.map_err(|e| {
            let err = TranslateError::from(e);
            if let Some(status) = err.status() {
                tracing::warn!(status, url = %url, error = %err, "Upstream rejected streaming request");
            }
            err
        }),
    }
}
