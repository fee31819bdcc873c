//! Adapter for the native Gemini `generateContent` API.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{open_stream, validate_adapter_config, AdapterKind, CallParams, ChunkStream, TranslationAdapter};
use crate::auth::{GoogleApiKeyAuthManager, SharedAuth};
use crate::config::AdapterConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::streaming::{next_or_abort, ChunkSimulator, JsonObjectStream};
use crate::transport::{endpoints, HttpTransport, RequestBuilder, ResponseParser};
use crate::types::gemini::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::types::{StreamChunk, TranslationRequest, TranslationResponse, Usage};

/// Gemini via `streamGenerateContent`, whose body is a run of JSON objects.
///
/// Each object's text is emitted as a delta. An object carrying a
/// `finishReason` ends the stream; if it is also the first object with text,
/// that text is replayed through the simulator instead.
pub struct NativeGeminiAdapter {
    config: Arc<AdapterConfig>,
    transport: Arc<dyn HttpTransport>,
    request_builder: RequestBuilder,
    simulator: Arc<ChunkSimulator>,
}

impl NativeGeminiAdapter {
    /// Creates the adapter, rejecting an empty API key or base URL.
    pub fn new(config: AdapterConfig, transport: Arc<dyn HttpTransport>) -> TranslateResult<Self> {
        validate_adapter_config(&config)?;
        let auth: SharedAuth = Arc::new(GoogleApiKeyAuthManager::new(config.api_key.clone()));

        Ok(Self {
            config: Arc::new(config),
            transport,
            request_builder: RequestBuilder::new(auth),
            simulator: Arc::new(ChunkSimulator::default()),
        })
    }

    /// Replaces the simulator used when the answer arrives in one object.
    pub fn with_simulator(mut self, simulator: Arc<ChunkSimulator>) -> Self {
        self.simulator = simulator;
        self
    }

    fn body(&self, request: &TranslationRequest) -> TranslateResult<(String, GenerateContentRequest)> {
        let params = CallParams::resolve(&self.config, request)?;
        let prompt = self.build_translation_prompt(
            &request.text,
            request.system_message.as_deref(),
            request.target_language.as_deref(),
        );

        let body = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: Some(GenerationConfig {
                max_output_tokens: params.max_tokens,
                temperature: params.temperature,
            }),
        };

        Ok((params.model, body))
    }
}

#[async_trait]
impl TranslationAdapter for NativeGeminiAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::NativeGemini
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationResponse> {
        let (model, body) = self.body(request)?;
        let url = endpoints::gemini_generate_content(&self.config.base_url, &model);
        debug!(model = %model, url = %url, "Dispatching generateContent request");

        let http_request = self.request_builder.post_json(&url, &body, None)?;
        let response = self.transport.send(http_request).await?;
        let parsed = ResponseParser::parse_response::<GenerateContentResponse>(response)?.into_result()?;

        if parsed.candidates.is_empty() {
            return Err(TranslateError::UpstreamFormat {
                message: "response contained no candidates".to_string(),
            });
        }

        Ok(TranslationResponse {
            content: parsed.text(),
            usage: parsed.usage_metadata.map(Usage::from),
        })
    }

    fn translate_stream(&self, request: TranslationRequest, cancel: CancellationToken) -> ChunkStream {
        let prepared = self.body(&request).and_then(|(model, body)| {
            let url = endpoints::gemini_stream_generate_content(&self.config.base_url, &model);
            debug!(model = %model, url = %url, "Dispatching streamGenerateContent request");
            self.request_builder.post_json(&url, &body, None)
        });
        let transport = Arc::clone(&self.transport);
        let simulator = Arc::clone(&self.simulator);

        Box::pin(try_stream! {
            let http_request = prepared?;
            let body = open_stream(transport.as_ref(), http_request, &cancel).await?;
            let mut objects = JsonObjectStream::<_, GenerateContentResponse>::new(body);

            let mut usage = None;
            let mut emitted = false;
            let mut atomic = None;

            while let Some(object) = next_or_abort(&mut objects, &cancel).await? {
                let object = object?.into_result()?;
                if let Some(meta) = object.usage_metadata {
                    usage = Some(Usage::from(meta));
                }

                let text = object.text();
                let finished = object.finish_reason().is_some();

                if finished && !emitted {
                    atomic = Some(text);
                    break;
                }
                if !text.is_empty() {
                    emitted = true;
                    yield StreamChunk::delta(text);
                }
                if finished {
                    break;
                }
            }
            drop(objects);

            match atomic {
                Some(text) => {
                    debug!(chars = text.chars().count(), "Simulating stream for single-object response");
                    let mut simulated = simulator.simulate(text, usage, cancel);
                    while let Some(chunk) = simulated.next().await {
                        yield chunk?;
                    }
                }
                None => yield StreamChunk::complete(usage),
            }
        })
    }
}
