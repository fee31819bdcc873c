//! Downstream frame encoding.
//!
//! Frames follow the OpenAI `chat.completion.chunk` shape so any client that
//! reads OpenAI streams can consume them.

use bytes::Bytes;
use serde::Serialize;

use crate::types::Usage;

/// Stream-end sentinel, sent once after the terminal frame.
pub const DONE_FRAME: &[u8] = b"data: [DONE]\n\n";

/// Error `type` reported downstream.
pub const STREAM_ERROR_TYPE: &str = "stream_error";

const CHUNK_OBJECT: &str = "chat.completion.chunk";

const ENCODING_FAILED: &[u8] =
    b"data: {\"error\":{\"message\":\"failed to encode frame\",\"type\":\"stream_error\"}}\n\n";

#[derive(Serialize)]
struct ChunkFrame<'a> {
    choices: [FrameChoice<'a>; 1],
    model: &'a str,
    object: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<&'a Usage>,
}

#[derive(Serialize)]
struct FrameChoice<'a> {
    delta: FrameDelta<'a>,
    index: u32,
    finish_reason: Option<&'static str>,
}

#[derive(Serialize)]
struct FrameDelta<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

#[derive(Serialize)]
struct ErrorFrame<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

fn encode<T: Serialize>(payload: &T) -> Bytes {
    match serde_json::to_vec(payload) {
        Ok(json) => {
            let mut frame = Vec::with_capacity(json.len() + 8);
            frame.extend_from_slice(b"data: ");
            frame.extend_from_slice(&json);
            frame.extend_from_slice(b"\n\n");
            Bytes::from(frame)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode downstream frame");
            Bytes::from_static(ENCODING_FAILED)
        }
    }
}

/// A content delta.
pub fn delta_frame(model: &str, content: &str) -> Bytes {
    encode(&ChunkFrame {
        choices: [FrameChoice {
            delta: FrameDelta { content: Some(content) },
            index: 0,
            finish_reason: None,
        }],
        model,
        object: CHUNK_OBJECT,
        usage: None,
    })
}

/// The terminal frame: empty delta, `finish_reason: "stop"`, usage if known.
pub fn terminal_frame(model: &str, usage: Option<&Usage>) -> Bytes {
    encode(&ChunkFrame {
        choices: [FrameChoice {
            delta: FrameDelta { content: None },
            index: 0,
            finish_reason: Some("stop"),
        }],
        model,
        object: CHUNK_OBJECT,
        usage,
    })
}

/// An error frame.
pub fn error_frame(message: &str) -> Bytes {
    encode(&ErrorFrame {
        error: ErrorBody {
            message,
            kind: STREAM_ERROR_TYPE,
        },
    })
}

/// The `[DONE]` sentinel.
pub fn done_frame() -> Bytes {
    Bytes::from_static(DONE_FRAME)
}
