//! Per-request translation context.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::adapters::TranslationAdapter;
use crate::config::ProviderConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::factory::AdapterFactory;
use crate::processor::{FrameStream, StreamProcessor};
use crate::types::{TranslationRequest, TranslationResponse};

/// Everything one translation request needs, built fresh per request.
///
/// Nothing here is shared between requests, so concurrent requests cannot
/// observe each other's adapter or cancellation state. [`abort`](Self::abort)
/// stops every call started from this context.
pub struct TranslationContext {
    adapter: Arc<dyn TranslationAdapter>,
    processor: StreamProcessor,
    cancel: CancellationToken,
}

impl TranslationContext {
    /// Validates `config` and builds the adapter through `factory`.
    pub fn new(config: &ProviderConfig, factory: &AdapterFactory) -> TranslateResult<Self> {
        Ok(Self::from_adapter(factory.create_adapter(config)?))
    }

    /// Wraps an already constructed adapter.
    pub fn from_adapter(adapter: Arc<dyn TranslationAdapter>) -> Self {
        Self {
            adapter,
            processor: StreamProcessor::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// The adapter serving this context.
    pub fn adapter(&self) -> &Arc<dyn TranslationAdapter> {
        &self.adapter
    }

    /// Non-streaming translation; fails with `Aborted` if the context is aborted first.
    pub async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationResponse> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(TranslateError::Aborted),
            result = self.adapter.translate(request) => result,
        }
    }

    /// Streaming translation rendered as downstream frames.
    ///
    /// Dropping the returned stream aborts only this call.
    pub fn stream(&self, request: TranslationRequest) -> FrameStream {
        self.processor
            .process(Arc::clone(&self.adapter), request, self.cancel.child_token())
    }

    /// A token that fires when this context is aborted.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Aborts every call started from this context.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// True once [`abort`](Self::abort) has been called.
    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
