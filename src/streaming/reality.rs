//! Detection of genuinely incremental upstream delivery.

use std::time::Duration;
use tokio::time::Instant;

/// Default gap between two deltas above which a stream is considered real.
pub const DEFAULT_REAL_STREAM_THRESHOLD: Duration = Duration::from_millis(50);

/// How a finished stream should be finalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamVerdict {
    /// Deltas were passed through as they arrived. `remaining` holds anything
    /// still buffered (always empty once the stream turned real).
    Real {
        /// Text not yet emitted.
        remaining: String,
    },
    /// Everything arrived as one burst; `text` should be simulated.
    Atomic {
        /// The complete buffered text.
        text: String,
    },
}

/// Classifies a stream as real or atomic from the timing of its deltas.
///
/// Deltas are held back until one arrives more than `threshold` after the
/// previous one. At that point the stream is marked real, the held text is
/// released in one piece and every later delta passes straight through.
#[derive(Debug)]
pub struct RealityDetector {
    threshold: Duration,
    last_delta_at: Option<Instant>,
    is_real: bool,
    pending: String,
}

impl Default for RealityDetector {
    fn default() -> Self {
        Self::new(DEFAULT_REAL_STREAM_THRESHOLD)
    }
}

impl RealityDetector {
    /// Creates a detector with the given gap threshold.
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_delta_at: None,
            is_real: false,
            pending: String::new(),
        }
    }

    /// Records a delta received at `now`.
    ///
    /// Returns the text that may be emitted immediately, if any.
    pub fn observe(&mut self, delta: &str, now: Instant) -> Option<String> {
        let previous = self.last_delta_at.replace(now);

        if self.is_real {
            return Some(delta.to_string());
        }

        self.pending.push_str(delta);

        match previous {
            Some(at) if now.saturating_duration_since(at) > self.threshold => {
                self.is_real = true;
                tracing::debug!(
                    gap_ms = u64::try_from(now.saturating_duration_since(at).as_millis()).unwrap_or(u64::MAX),
                    "Upstream is streaming incrementally"
                );
                Some(std::mem::take(&mut self.pending))
            }
            _ => None,
        }
    }

    /// True once a delta has arrived after a gap above the threshold.
    pub fn is_real_stream(&self) -> bool {
        self.is_real
    }

    /// Consumes the detector at end of stream.
    pub fn finish(self) -> StreamVerdict {
        if self.is_real {
            StreamVerdict::Real {
                remaining: self.pending,
            }
        } else {
            tracing::debug!(
                chars = self.pending.chars().count(),
                "Upstream delivered an atomic payload"
            );
            StreamVerdict::Atomic { text: self.pending }
        }
    }
}
