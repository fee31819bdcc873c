//! Adapter for Gemini's OpenAI-compatible surface.
//!
//! This endpoint sometimes answers a `stream: true` request with the whole
//! translation in a single SSE event. Deltas are therefore routed through a
//! [`RealityDetector`]; if the stream never shows a gap between deltas the
//! buffered text is replayed through the [`ChunkSimulator`].

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{validate_adapter_config, AdapterKind, ChatCompletions, ChatDelta, ChunkStream, TranslationAdapter};
use crate::config::AdapterConfig;
use crate::error::TranslateResult;
use crate::streaming::{ChunkSimulator, RealityDetector, StreamVerdict, DEFAULT_REAL_STREAM_THRESHOLD};
use crate::transport::{endpoints, HttpTransport};
use crate::types::{StreamChunk, TranslationRequest, TranslationResponse};

/// Gemini via `/v1beta/openai/chat/completions`, with simulated streaming.
pub struct GeminiOpenAiCompatibleAdapter {
    config: Arc<AdapterConfig>,
    chat: ChatCompletions,
    simulator: Arc<ChunkSimulator>,
    threshold: Duration,
}

impl GeminiOpenAiCompatibleAdapter {
    /// Creates the adapter, rejecting an empty API key or base URL.
    pub fn new(config: AdapterConfig, transport: Arc<dyn HttpTransport>) -> TranslateResult<Self> {
        validate_adapter_config(&config)?;
        let config = Arc::new(config);

        Ok(Self {
            chat: ChatCompletions::new(Arc::clone(&config), transport)
                .with_url(endpoints::gemini_openai_chat_completions(&config.base_url)),
            config,
            simulator: Arc::new(ChunkSimulator::default()),
            threshold: DEFAULT_REAL_STREAM_THRESHOLD,
        })
    }

    /// Replaces the simulator used for atomic payloads.
    pub fn with_simulator(mut self, simulator: Arc<ChunkSimulator>) -> Self {
        self.simulator = simulator;
        self
    }

    /// Sets the inter-delta gap that marks a stream as real.
    pub fn with_real_stream_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }
}

#[async_trait]
impl TranslationAdapter for GeminiOpenAiCompatibleAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::GeminiOpenAiCompatible
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationResponse> {
        self.chat.complete(request).await
    }

    fn translate_stream(&self, request: TranslationRequest, cancel: CancellationToken) -> ChunkStream {
        let mut deltas = self.chat.deltas(&request, cancel.clone());
        let simulator = Arc::clone(&self.simulator);
        let threshold = self.threshold;

        Box::pin(try_stream! {
            let mut detector = RealityDetector::new(threshold);
            let mut usage = None;

            while let Some(delta) = deltas.next().await {
                match delta? {
                    ChatDelta::Content(text) => {
                        if let Some(ready) = detector.observe(&text, Instant::now()) {
                            yield StreamChunk::delta(ready);
                        }
                    }
                    ChatDelta::Usage(reported) => usage = Some(reported),
                }
            }
            drop(deltas);

            match detector.finish() {
                StreamVerdict::Real { remaining } => {
                    if !remaining.is_empty() {
                        yield StreamChunk::delta(remaining);
                    }
                    yield StreamChunk::complete(usage);
                }
                StreamVerdict::Atomic { text } => {
                    let mut simulated = simulator.simulate(text, usage, cancel);
                    while let Some(chunk) = simulated.next().await {
                        yield chunk?;
                    }
                }
            }
        })
    }
}
