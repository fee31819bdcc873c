//! Streaming support shared by the provider adapters.
//!
//! - `json_objects`: incremental parser for bodies that concatenate JSON
//!   objects with no delimiter (native Gemini `streamGenerateContent`)
//! - `reality`: detects whether an upstream delivers real increments or one
//!   buffered payload
//! - `simulator`: turns an atomic text into a paced sequence of pieces
//!
//! All awaits inside adapter streams go through [`next_or_abort`] and
//! [`sleep_or_abort`] so cancellation is observed at every chunk boundary.

mod json_objects;
mod reality;
mod simulator;

pub use json_objects::{JsonObjectParser, JsonObjectStream};
pub use reality::{RealityDetector, StreamVerdict, DEFAULT_REAL_STREAM_THRESHOLD};
pub use simulator::{
    ChunkPacing, ChunkSimulator, FixedPacing, RandomPacing, SimulatorConfig,
};

use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{TranslateError, TranslateResult};

/// Pulls the next item unless the token fires first.
pub async fn next_or_abort<S>(stream: &mut S, cancel: &CancellationToken) -> TranslateResult<Option<S::Item>>
where
    S: Stream + Unpin,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(TranslateError::Aborted),
        item = stream.next() => Ok(item),
    }
}

/// Sleeps for `duration` unless the token fires first.
pub async fn sleep_or_abort(duration: Duration, cancel: &CancellationToken) -> TranslateResult<()> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(TranslateError::Aborted),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}
