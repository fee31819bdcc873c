//! Rendering of adapter output as the downstream event stream.

pub mod frames;

use async_stream::stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::adapters::{ChunkStream, TranslationAdapter};
use crate::error::{TranslateError, TranslateResult};
use crate::streaming::next_or_abort;
use crate::types::TranslationRequest;

/// Encoded downstream frames, each a complete `data: ...\n\n` event.
pub type FrameStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// Message of the error event sent when an adapter stops without completing.
pub const INCOMPLETE_STREAM_MESSAGE: &str = "upstream stream ended without completion";

/// Drives an adapter stream and frames its chunks.
///
/// Every frame stream ends after exactly one of: the terminal frame plus
/// `[DONE]`, a single error frame, or nothing further once cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamProcessor;

impl StreamProcessor {
    /// Creates a processor.
    pub fn new() -> Self {
        Self
    }

    /// Headers for an HTTP response carrying a frame stream.
    pub fn response_headers() -> [(&'static str, &'static str); 3] {
        [
            ("Content-Type", "text/event-stream; charset=utf-8"),
            ("Cache-Control", "no-cache"),
            ("Connection", "keep-alive"),
        ]
    }

    /// Starts `adapter` on `request` and returns the framed output.
    ///
    /// Nothing is sent upstream until the returned stream is first polled.
    /// Cancelling `cancel` stops the stream at the next chunk boundary
    /// without emitting further frames; dropping the stream before it
    /// completes cancels `cancel`.
    pub fn process(
        &self,
        adapter: Arc<dyn TranslationAdapter>,
        request: TranslationRequest,
        cancel: CancellationToken,
    ) -> FrameStream {
        let model = if request.model.trim().is_empty() {
            adapter.config().model.clone()
        } else {
            request.model.clone()
        };
        let guard = cancel.clone().drop_guard();

        Box::pin(stream! {
            let guard = guard;
            let kind = adapter.kind();
            let mut chunks = adapter.translate_stream(request, cancel.clone());
            let mut deltas = 0usize;

            loop {
                if cancel.is_cancelled() {
                    debug!(adapter = %kind, deltas, "Stream cancelled by consumer");
                    break;
                }

                match next_or_abort(&mut chunks, &cancel).await {
                    Err(_) | Ok(Some(Err(TranslateError::Aborted))) => {
                        debug!(adapter = %kind, deltas, "Stream cancelled by consumer");
                        break;
                    }
                    Ok(Some(Ok(chunk))) if chunk.is_complete => {
                        yield frames::terminal_frame(&model, chunk.usage.as_ref());
                        yield frames::done_frame();
                        debug!(adapter = %kind, deltas, "Stream completed");
                        break;
                    }
                    Ok(Some(Ok(chunk))) => {
                        if !chunk.content.is_empty() {
                            deltas += 1;
                            yield frames::delta_frame(&model, &chunk.content);
                        }
                    }
                    Ok(Some(Err(e))) => {
                        warn!(adapter = %kind, deltas, error = %e, "Translation stream failed");
                        yield frames::error_frame(&e.to_string());
                        break;
                    }
                    Ok(None) => {
                        warn!(adapter = %kind, deltas, "Adapter stream ended without a terminal chunk");
                        yield frames::error_frame(INCOMPLETE_STREAM_MESSAGE);
                        break;
                    }
                }
            }

            drop(chunks);
            guard.disarm();
        })
    }
}

/// Drains an adapter stream and returns the concatenated delta text.
///
/// Fails with the first error in the stream, or if it ends without a
/// terminal chunk.
pub async fn collect_text(mut chunks: ChunkStream) -> TranslateResult<String> {
    let mut text = String::new();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        if chunk.is_complete {
            return Ok(text);
        }
        text.push_str(&chunk.content);
    }

    Err(TranslateError::UpstreamFormat {
        message: INCOMPLETE_STREAM_MESSAGE.to_string(),
    })
}
