//! Simulated streaming for upstreams that return one atomic payload.
//!
//! The simulator splits a complete text into pieces that concatenate back to
//! the input exactly, then emits them with a short delay between each so the
//! downstream consumer sees a believable incremental stream.

use async_stream::try_stream;
use rand::Rng;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::sleep_or_abort;
use crate::adapters::ChunkStream;
use crate::error::TranslateError;
use crate::types::{StreamChunk, Usage};

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

/// Blank line, plus any whitespace that follows it.
fn paragraph_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"\r?\n[ \t]*\r?\n\s*"))
}

/// Terminal punctuation followed by whitespace.
fn sentence_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"[.!?]+\s+"))
}

/// A word and the whitespace after it.
fn word_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"\S+\s*"))
}

/// Thresholds controlling how text is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Texts shorter than this many characters are emitted whole.
    pub short_text_chars: usize,
    /// Sentence splitting only applies above this many characters.
    pub sentence_split_chars: usize,
    /// Smallest word window.
    pub min_words: usize,
    /// Largest word window.
    pub max_words: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            short_text_chars: 50,
            sentence_split_chars: 200,
            min_words: 5,
            max_words: 15,
        }
    }
}

/// Source of window sizes and inter-piece delays.
pub trait ChunkPacing: Send + Sync {
    /// Picks a word-window size in `min..=max`.
    fn window_size(&self, min: usize, max: usize) -> usize;

    /// Delay before each piece after the first.
    fn delay(&self) -> Duration;
}

/// Jittered pacing used in production.
#[derive(Debug, Clone, Copy)]
pub struct RandomPacing {
    /// Lower delay bound.
    pub min_delay: Duration,
    /// Upper delay bound.
    pub max_delay: Duration,
}

impl Default for RandomPacing {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(80),
            max_delay: Duration::from_millis(120),
        }
    }
}

impl ChunkPacing for RandomPacing {
    fn window_size(&self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    fn delay(&self) -> Duration {
        if self.min_delay >= self.max_delay {
            return self.min_delay;
        }
        let min = u64::try_from(self.min_delay.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Deterministic pacing for tests and reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedPacing {
    /// Words per window; clamped into the configured range.
    pub window: usize,
    /// Delay between pieces.
    pub delay: Duration,
}

impl ChunkPacing for FixedPacing {
    fn window_size(&self, min: usize, max: usize) -> usize {
        self.window.clamp(min, max.max(min))
    }

    fn delay(&self) -> Duration {
        self.delay
    }
}

/// Splits atomic text into pieces and replays them as a paced chunk stream.
#[derive(Clone)]
pub struct ChunkSimulator {
    config: SimulatorConfig,
    pacing: Arc<dyn ChunkPacing>,
}

impl fmt::Debug for ChunkSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkSimulator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ChunkSimulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default(), Arc::new(RandomPacing::default()))
    }
}

impl ChunkSimulator {
    /// Creates a simulator.
    pub fn new(config: SimulatorConfig, pacing: Arc<dyn ChunkPacing>) -> Self {
        Self { config, pacing }
    }

    /// Returns the split thresholds.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Splits `text` into ordered pieces whose concatenation is `text`.
    ///
    /// Paragraphs are preferred, then sentences (long texts only), then word
    /// windows. Separators stay attached to the piece they follow.
    pub fn intelligent_chunk(&self, text: &str) -> Vec<String> {
        let length = text.chars().count();
        if length < self.config.short_text_chars {
            return vec![text.to_string()];
        }

        let paragraphs = split_after(text, paragraph_separator());
        if paragraphs.len() >= 2 {
            return paragraphs;
        }

        if length > self.config.sentence_split_chars {
            let sentences = split_after(text, sentence_separator());
            if sentences.len() >= 2 {
                return sentences;
            }
        }

        self.word_windows(text)
    }

    fn word_windows(&self, text: &str) -> Vec<String> {
        let ends: Vec<usize> = word_token().find_iter(text).map(|m| m.end()).collect();
        if ends.is_empty() {
            return vec![text.to_string()];
        }

        let min = self.config.min_words.max(1);
        let max = self.config.max_words.max(min);
        let mut windows = Vec::new();
        // Leading whitespace belongs to the first window.
        let mut window_start = 0;
        let mut index = 0;

        while index < ends.len() {
            let size = self.pacing.window_size(min, max).clamp(min, max);
            index = (index + size).min(ends.len());
            let end = ends[index - 1];
            windows.push(text[window_start..end].to_string());
            window_start = end;
        }

        windows
    }

    /// Replays `text` as a chunk stream.
    ///
    /// The first piece is emitted at once and each later one after a pacing
    /// delay. The terminal chunk carries `usage` when the upstream reported
    /// it, otherwise a total equal to the character count.
    pub fn simulate(&self, text: String, usage: Option<Usage>, cancel: CancellationToken) -> ChunkStream {
        let pieces: Vec<String> = self
            .intelligent_chunk(&text)
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .collect();
        let usage = usage.unwrap_or_else(|| {
            Usage::total(u32::try_from(text.chars().count()).unwrap_or(u32::MAX))
        });
        let pacing = Arc::clone(&self.pacing);

        tracing::debug!(pieces = pieces.len(), "Simulating incremental stream");

        Box::pin(try_stream! {
            if cancel.is_cancelled() {
                Err::<(), _>(TranslateError::Aborted)?;
            }

            for (index, piece) in pieces.into_iter().enumerate() {
                if index > 0 {
                    sleep_or_abort(pacing.delay(), &cancel).await?;
                }
                yield StreamChunk::delta(piece);
            }

            yield StreamChunk::complete(Some(usage));
        })
    }
}

/// Splits `text` after every match of `separator`, keeping the separator on
/// the preceding piece. Whitespace-only pieces are merged into a neighbour.
fn split_after(text: &str, separator: &Regex) -> Vec<String> {
    let mut raw = Vec::new();
    let mut last = 0;
    for m in separator.find_iter(text) {
        if m.end() > last {
            raw.push(&text[last..m.end()]);
            last = m.end();
        }
    }
    if last < text.len() {
        raw.push(&text[last..]);
    }

    let mut pieces: Vec<String> = Vec::with_capacity(raw.len());
    let mut carry = String::new();
    for piece in raw {
        if piece.trim().is_empty() {
            match pieces.last_mut() {
                Some(previous) => previous.push_str(piece),
                None => carry.push_str(piece),
            }
        } else {
            let mut owned = std::mem::take(&mut carry);
            owned.push_str(piece);
            pieces.push(owned);
        }
    }
    if !carry.is_empty() {
        pieces.push(carry);
    }

    pieces
}
