//! Core request, response and chunk types, plus upstream wire formats.

pub mod gemini;
pub mod openai;

use serde::{Deserialize, Serialize};

/// Token usage reported for a translation.
///
/// Serialized in the OpenAI `snake_case` shape used on the downstream wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    /// Tokens generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
    /// Total tokens.
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    /// Usage carrying only a total.
    pub fn total(total_tokens: u32) -> Self {
        Self {
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens,
        }
    }
}

/// A translation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    /// Text to translate (non-empty).
    pub text: String,
    /// Model override; empty means the adapter's configured model.
    #[serde(default)]
    pub model: String,
    /// Max tokens override; zero means the adapter's configured value.
    #[serde(default)]
    pub max_tokens: u32,
    /// Custom system instruction replacing the default template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    /// Target language name used by the default template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    /// Temperature override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl TranslationRequest {
    /// Creates a request that uses the adapter's configured model and limits.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: String::new(),
            max_tokens: 0,
            system_message: None,
            target_language: None,
            temperature: None,
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets a custom system instruction.
    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    /// Sets the target language.
    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Result of a non-streaming translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationResponse {
    /// Translated text.
    pub content: String,
    /// Token usage, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One element of an adapter's output sequence.
///
/// Within a stream exactly one chunk is complete and it is always the last;
/// the contents of the preceding chunks concatenate to the full translation.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    /// Text delta; empty on the terminal chunk.
    pub content: String,
    /// Marks the terminal chunk.
    pub is_complete: bool,
    /// Usage, only ever set on the terminal chunk.
    pub usage: Option<Usage>,
}

impl StreamChunk {
    /// A content delta.
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_complete: false,
            usage: None,
        }
    }

    /// The terminal chunk.
    pub fn complete(usage: Option<Usage>) -> Self {
        Self {
            content: String::new(),
            is_complete: true,
            usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_serialization_skips_missing_parts() {
        let json = serde_json::to_string(&Usage::total(42)).unwrap();
        assert_eq!(json, r#"{"total_tokens":42}"#);
    }

    #[test]
    fn test_request_deserialize_camel_case() {
        let request: TranslationRequest = serde_json::from_str(
            r#"{"text":"Hallo","model":"gpt-4o","maxTokens":100,"targetLanguage":"English"}"#,
        )
        .unwrap();
        assert_eq!(request.max_tokens, 100);
        assert_eq!(request.target_language.as_deref(), Some("English"));
        assert_eq!(request.system_message, None);
    }

    #[test]
    fn test_chunk_constructors() {
        let delta = StreamChunk::delta("Hi");
        assert!(!delta.is_complete);
        assert!(delta.usage.is_none());

        let done = StreamChunk::complete(Some(Usage::total(3)));
        assert!(done.is_complete);
        assert!(done.content.is_empty());
    }
}
