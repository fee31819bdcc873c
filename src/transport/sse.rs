//! Line-oriented Server-Sent Events decoding.
//!
//! OpenAI-compatible endpoints frame each delta as a `data: {json}` line
//! followed by a blank line, and finish with `data: [DONE]`. Events are
//! produced as soon as their line is complete, regardless of how the bytes
//! were split across network reads.

use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::TranslateError;
use super::error::TransportError;

/// Sentinel payload that ends an OpenAI-style stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The payload after the `data:` prefix, trimmed.
    pub data: String,
}

impl SseEvent {
    /// Returns true for the `[DONE]` sentinel.
    pub fn is_done(&self) -> bool {
        self.data == DONE_SENTINEL
    }

    /// Decodes a single line; `None` for blank lines, comments and non-data fields.
    pub fn from_line(line: &[u8]) -> Option<Self> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let payload = line.strip_prefix(b"data:")?;
        let data = String::from_utf8_lossy(payload).trim().to_string();
        if data.is_empty() {
            None
        } else {
            Some(Self { data })
        }
    }
}

pin_project! {
    /// Decodes a chunked byte stream into `SseEvent`s.
    pub struct SseStream<S> {
        #[pin]
        inner: S,
        buffer: Vec<u8>,
        pending: VecDeque<SseEvent>,
        finished: bool,
    }
}

impl<S> SseStream<S>
where
    S: Stream<Item = Result<Bytes, TransportError>>,
{
    /// Wraps a chunked body.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }
}

fn drain_lines(buffer: &mut Vec<u8>, pending: &mut VecDeque<SseEvent>) {
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        if let Some(event) = SseEvent::from_line(&line[..line.len() - 1]) {
            pending.push_back(event);
        }
    }
}

impl<S> Stream for SseStream<S>
where
    S: Stream<Item = Result<Bytes, TransportError>>,
{
    type Item = Result<SseEvent, TranslateError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            if *this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    this.buffer.extend_from_slice(&chunk);
                    drain_lines(this.buffer, this.pending);
                }
                Poll::Ready(Some(Err(e))) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(TranslateError::from(e))));
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    if !this.buffer.is_empty() {
                        let rest = std::mem::take(this.buffer);
                        if let Some(event) = SseEvent::from_line(&rest) {
                            this.pending.push_back(event);
                        }
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
