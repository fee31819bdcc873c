//! Adapter for OpenAI and OpenAI-compatible chat-completions APIs.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{validate_adapter_config, AdapterKind, ChatCompletions, ChatDelta, ChunkStream, TranslationAdapter};
use crate::config::AdapterConfig;
use crate::error::TranslateResult;
use crate::transport::HttpTransport;
use crate::types::{StreamChunk, TranslationRequest, TranslationResponse};

/// Passes SSE deltas through as they arrive.
pub struct OpenAiCompatibleAdapter {
    config: Arc<AdapterConfig>,
    chat: ChatCompletions,
}

impl OpenAiCompatibleAdapter {
    /// Creates the adapter, rejecting an empty API key or base URL.
    pub fn new(config: AdapterConfig, transport: Arc<dyn HttpTransport>) -> TranslateResult<Self> {
        validate_adapter_config(&config)?;
        let config = Arc::new(config);

        Ok(Self {
            chat: ChatCompletions::new(Arc::clone(&config), transport),
            config,
        })
    }
}

#[async_trait]
impl TranslationAdapter for OpenAiCompatibleAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::OpenAiCompatible
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationResponse> {
        self.chat.complete(request).await
    }

    fn translate_stream(&self, request: TranslationRequest, cancel: CancellationToken) -> ChunkStream {
        let mut deltas = self.chat.deltas(&request, cancel);

        Box::pin(try_stream! {
            let mut usage = None;

            while let Some(delta) = deltas.next().await {
                match delta? {
                    ChatDelta::Content(text) => yield StreamChunk::delta(text),
                    ChatDelta::Usage(reported) => usage = Some(reported),
                }
            }

            yield StreamChunk::complete(usage);
        })
    }
}
