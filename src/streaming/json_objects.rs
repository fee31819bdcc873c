//! Incremental parser for undelimited JSON object streams.
//!
//! The native Gemini streaming endpoint writes a sequence of complete JSON
//! objects with no framing between them. A single network read may carry
//! zero, one or several objects, and may cut an object (or a multi-byte UTF-8
//! character) anywhere. The parser keeps its scan state across reads so the
//! objects it yields depend only on the total byte sequence, never on where
//! the read boundaries fell.
//!
//! Any bytes outside top-level objects (array brackets, commas, whitespace)
//! are skipped, so the JSON-array form `[{...},\n{...}]` parses the same way.

use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::TranslateError;
use crate::transport::TransportError;

/// Lexical state of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Not inside a string literal; braces are structural.
    Outside,
    /// Inside a string literal.
    InString,
    /// The previous byte was a backslash inside a string.
    Escaped,
}

/// Brace-depth scanner over a growing byte buffer.
#[derive(Debug)]
pub struct JsonObjectParser {
    buffer: Vec<u8>,
    /// Next byte to scan.
    cursor: usize,
    depth: usize,
    state: ScanState,
    /// Start of the top-level object currently open.
    object_start: Option<usize>,
    discarded: usize,
}

impl Default for JsonObjectParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonObjectParser {
    /// Creates an empty parser.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            depth: 0,
            state: ScanState::Outside,
            object_start: None,
            discarded: 0,
        }
    }

    /// Appends `data` and returns every object completed by it, in order.
    ///
    /// Candidates that close structurally but fail to decode as `T` are
    /// dropped and counted in [`discarded`](Self::discarded).
    pub fn feed<T: DeserializeOwned>(&mut self, data: &[u8]) -> Vec<T> {
        self.buffer.extend_from_slice(data);
        let mut objects = Vec::new();

        while self.cursor < self.buffer.len() {
            let index = self.cursor;
            let byte = self.buffer[index];
            self.cursor += 1;

            match self.state {
                ScanState::Escaped => self.state = ScanState::InString,
                ScanState::InString => match byte {
                    b'\\' => self.state = ScanState::Escaped,
                    b'"' => self.state = ScanState::Outside,
                    _ => {}
                },
                ScanState::Outside => match byte {
                    b'"' => self.state = ScanState::InString,
                    b'{' => {
                        if self.depth == 0 {
                            self.object_start = Some(index);
                        }
                        self.depth += 1;
                    }
                    b'}' if self.depth > 0 => {
                        self.depth -= 1;
                        if self.depth == 0 {
                            if let Some(start) = self.object_start.take() {
                                let candidate = &self.buffer[start..=index];
                                match serde_json::from_slice::<T>(candidate) {
                                    Ok(object) => objects.push(object),
                                    Err(e) => {
                                        self.discarded += 1;
                                        tracing::debug!(
                                            error = %e,
                                            length = candidate.len(),
                                            "Discarding undecodable JSON object in stream"
                                        );
                                    }
                                }
                            }
                        }
                    }
                    _ => {}
                },
            }
        }

        self.compact();
        objects
    }

    /// Drops everything before the currently open object, or the whole
    /// scanned prefix when no object is open.
    fn compact(&mut self) {
        let keep_from = match self.object_start {
            Some(start) => start,
            None if self.state == ScanState::Outside => self.cursor,
            None => return,
        };

        if keep_from > 0 {
            self.buffer.drain(..keep_from);
            self.cursor -= keep_from;
            if let Some(start) = self.object_start.as_mut() {
                *start -= keep_from;
            }
        }
    }

    /// True if an object (or string) has been opened and not yet closed.
    pub fn has_partial(&self) -> bool {
        self.depth > 0 || self.state != ScanState::Outside
    }

    /// Bytes retained for the next read.
    pub fn remaining(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of structurally complete candidates that failed to decode.
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

pin_project! {
    /// Adapts a chunked body into a stream of decoded objects.
    ///
    /// A fragment left open when the body ends is logged and dropped; the
    /// stream then simply ends.
    pub struct JsonObjectStream<S, T> {
        #[pin]
        inner: S,
        parser: JsonObjectParser,
        pending: VecDeque<T>,
        finished: bool,
        _marker: PhantomData<fn() -> T>,
    }
}

impl<S, T> JsonObjectStream<S, T>
where
    S: Stream<Item = Result<Bytes, TransportError>>,
    T: DeserializeOwned,
{
    /// Wraps a chunked body.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            parser: JsonObjectParser::new(),
            pending: VecDeque::new(),
            finished: false,
            _marker: PhantomData,
        }
    }
}

impl<S, T> Stream for JsonObjectStream<S, T>
where
    S: Stream<Item = Result<Bytes, TransportError>>,
    T: DeserializeOwned,
{
    type Item = Result<T, TranslateError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(object) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(object)));
            }

            if *this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.pending.extend(this.parser.feed::<T>(&bytes));
                }
                Poll::Ready(Some(Err(e))) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(TranslateError::from(e))));
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    if this.parser.has_partial() {
                        tracing::warn!(
                            remaining_bytes = this.parser.remaining().len(),
                            "Stream ended inside an incomplete JSON object; discarding fragment"
                        );
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn feed_all(parts: &[&[u8]]) -> Vec<Value> {
        let mut parser = JsonObjectParser::new();
        parts.iter().flat_map(|p| parser.feed::<Value>(p)).collect()
    }

    #[test]
    fn test_two_objects_one_read() {
        let objects = feed_all(&[br#"{"a":1}{"b":{"c":2}}"#]);
        assert_eq!(objects, vec![json!({"a": 1}), json!({"b": {"c": 2}})]);
    }

    #[test]
    fn test_braces_inside_strings() {
        let objects = feed_all(&[br#"{"text":"a } b { c"}"#]);
        assert_eq!(objects, vec![json!({"text": "a } b { c"})]);
    }

    #[test]
    fn test_escaped_quote_and_backslash() {
        let objects = feed_all(&[br#"{"t":"say \"}\" \\"}{"u":1}"#]);
        assert_eq!(objects, vec![json!({"t": "say \"}\" \\"}), json!({"u": 1})]);
    }

    #[test]
    fn test_split_inside_escape() {
        let objects = feed_all(&[br#"{"t":"a\"#, br#""}"}"#]);
        assert_eq!(objects, vec![json!({"t": "a\"}"})]);
    }

    #[test]
    fn test_array_framing_is_skipped() {
        let objects = feed_all(&[b"[{\"a\":1}", b",\r\n{\"a\":2}]"]);
        assert_eq!(objects, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn test_invalid_candidate_is_discarded() {
        let mut parser = JsonObjectParser::new();
        let objects: Vec<Value> = parser.feed(br#"{"a":}{"b":2}"#);
        assert_eq!(objects, vec![json!({"b": 2})]);
        assert_eq!(parser.discarded(), 1);
        assert!(!parser.has_partial());
    }

    #[test]
    fn test_buffer_retains_only_open_object() {
        let mut parser = JsonObjectParser::new();
        let objects: Vec<Value> = parser.feed(br#"{"a":1} {"b":"#);
        assert_eq!(objects.len(), 1);
        assert!(parser.has_partial());
        assert_eq!(parser.remaining(), br#"{"b":"#);
    }

    #[test]
    fn test_multibyte_character_split_across_reads() {
        let text = "{\"t\":\"日本語\"}".as_bytes();
        let (head, tail) = text.split_at(8);
        let objects = feed_all(&[head, tail]);
        assert_eq!(objects, vec![json!({"t": "日本語"})]);
    }

    #[test]
    fn test_stray_closing_brace_ignored() {
        let objects = feed_all(&[br#"}{"a":1}"#]);
        assert_eq!(objects, vec![json!({"a": 1})]);
    }
}
