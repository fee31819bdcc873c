//! # Streaming Translation Adapters
//!
//! Dispatches translation requests to an upstream LLM provider and re-emits
//! the result as one uniform incremental event stream, whether the upstream
//! streams token by token, streams in its own framing, or answers atomically.
//!
//! ## Features
//!
//! - OpenAI-compatible chat completions over SSE
//! - Native Gemini `streamGenerateContent` with an incremental JSON object parser
//! - Gemini's OpenAI-compatible surface with detection of buffered "streams"
//! - Simulated streaming for atomic payloads that never alters content
//! - Exactly-once termination and cancellation at every chunk boundary
//! - Secure credential handling with `SecretString`
//! - Mock transport for testing without a network
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use integrations_translation::{AdapterFactory, ProviderConfig, TranslationContext, TranslationRequest};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig::builder()
//!         .provider("openai")
//!         .api_key(SecretString::new("sk-...".into()))
//!         .base_url("https://api.openai.com/v1")
//!         .model("gpt-4o-mini")
//!         .build();
//!
//!     let context = TranslationContext::new(&config, &AdapterFactory::new())?;
//!     let mut frames = context.stream(TranslationRequest::new("Bonjour").with_target_language("English"));
//!
//!     while let Some(frame) = frames.next().await {
//!         print!("{}", String::from_utf8_lossy(&frame));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `config` - Provider and adapter configuration
//! - `error` - Error types and upstream error mapping
//! - `auth` - Authentication header providers
//! - `transport` - HTTP transport, endpoints and SSE decoding
//! - `types` - Requests, responses, chunks and upstream wire types
//! - `streaming` - JSON object parser, reality detector, chunk simulator
//! - `adapters` - The adapter contract and the provider adapters
//! - `factory` - Configuration validation and adapter construction
//! - `processor` - Downstream framing, termination and cancellation
//! - `context` - Per-request context
//! - `observability` - Logging setup

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod adapters;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod observability;
pub mod processor;
pub mod streaming;
pub mod transport;
pub mod types;

// Testing support - always available for integration tests
pub mod mocks;

// Re-exports for convenience
pub use adapters::{
    AdapterKind, ChunkStream, GeminiOpenAiCompatibleAdapter, NativeGeminiAdapter,
    OpenAiCompatibleAdapter, TranslationAdapter,
};
pub use config::{
    AdapterConfig, Provider, ProviderConfig, ProviderConfigBuilder, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_MAX_TOKENS, DEFAULT_OPENAI_BASE_URL, DEFAULT_TEMPERATURE, TEMPERATURE_RANGE,
};
pub use context::TranslationContext;
pub use error::{ConfigurationError, NetworkError, TranslateError, TranslateResult};
pub use factory::{should_use_openai_compatible, validate_provider_config, AdapterFactory};
pub use processor::{collect_text, FrameStream, StreamProcessor};
pub use streaming::{ChunkSimulator, FixedPacing, RandomPacing, SimulatorConfig};
pub use types::{StreamChunk, TranslationRequest, TranslationResponse, Usage};
