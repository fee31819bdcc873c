//! Chat-completions client shared by the OpenAI-style adapters.

use async_stream::try_stream;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{open_stream, system_instruction, CallParams};
use crate::auth::{BearerAuthManager, SharedAuth};
use crate::config::AdapterConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::streaming::next_or_abort;
use crate::transport::{endpoints, HttpRequest, HttpTransport, RequestBuilder, ResponseParser, SseStream};
use crate::types::openai::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::types::{TranslationRequest, TranslationResponse, Usage};

/// One decoded item of a chat-completions SSE stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatDelta {
    /// Non-empty text from `choices[0].delta.content`.
    Content(String),
    /// A `usage` object; later ones supersede earlier ones.
    Usage(Usage),
}

/// Stream of deltas ending at `[DONE]` or end of body.
pub type DeltaStream = Pin<Box<dyn Stream<Item = TranslateResult<ChatDelta>> + Send>>;

/// Client for a `/chat/completions` endpoint.
pub struct ChatCompletions {
    config: Arc<AdapterConfig>,
    transport: Arc<dyn HttpTransport>,
    request_builder: RequestBuilder,
    url: String,
}

impl ChatCompletions {
    /// Creates a client authenticating with a bearer token.
    pub fn new(config: Arc<AdapterConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        let auth: SharedAuth = Arc::new(BearerAuthManager::new(config.api_key.clone()));
        let url = endpoints::chat_completions(&config.base_url);

        Self {
            config,
            transport,
            request_builder: RequestBuilder::new(auth),
            url,
        }
    }

    /// Overrides the endpoint URL derived from the base URL.
    pub fn with_url(mut self, url: String) -> Self {
        self.url = url;
        self
    }

    /// The resolved endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn body(&self, request: &TranslationRequest, stream: bool) -> TranslateResult<ChatCompletionRequest> {
        let params = CallParams::resolve(&self.config, request)?;
        let instruction = system_instruction(
            request.system_message.as_deref(),
            request.target_language.as_deref(),
        );

        Ok(ChatCompletionRequest {
            model: params.model,
            messages: vec![
                ChatMessage::system(instruction),
                ChatMessage::user(request.text.clone()),
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream,
        })
    }

    fn http_request(&self, request: &TranslationRequest, stream: bool) -> TranslateResult<HttpRequest> {
        let body = self.body(request, stream)?;
        debug!(model = %body.model, url = %self.url, stream, "Dispatching chat completion request");
        let accept = stream.then_some("text/event-stream");
        self.request_builder.post_json(&self.url, &body, accept)
    }

    /// Non-streaming completion.
    pub async fn complete(&self, request: &TranslationRequest) -> TranslateResult<TranslationResponse> {
        let http_request = self.http_request(request, false)?;
        let response = self.transport.send(http_request).await?;
        let parsed: ChatCompletionResponse = ResponseParser::parse_response(response)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TranslateError::UpstreamFormat {
                message: "response contained no message content".to_string(),
            })?;

        Ok(TranslationResponse {
            content,
            usage: parsed.usage,
        })
    }

    /// Streaming completion decoded into deltas.
    ///
    /// Payloads that are not valid chunks are skipped; an `error` payload
    /// fails the stream. Cancellation is
    /// checked while waiting for the response head and for each read.
    pub fn deltas(&self, request: &TranslationRequest, cancel: CancellationToken) -> DeltaStream {
        let prepared = self.http_request(request, true);
        let transport = Arc::clone(&self.transport);

        Box::pin(try_stream! {
            let http_request = prepared?;
            let body = open_stream(transport.as_ref(), http_request, &cancel).await?;
            let mut events = SseStream::new(body);

            while let Some(event) = next_or_abort(&mut events, &cancel).await? {
                let event = event?;
                if event.is_done() {
                    break;
                }

                let chunk = match serde_json::from_str::<ChatCompletionChunk>(&event.data) {
                    Ok(chunk) => chunk.into_result()?,
                    Err(e) => {
                        debug!(error = %e, "Skipping undecodable SSE payload");
                        continue;
                    }
                };

                if let Some(content) = chunk.delta_content().filter(|c| !c.is_empty()) {
                    yield ChatDelta::Content(content.to_string());
                }
                if let Some(usage) = chunk.usage {
                    yield ChatDelta::Usage(usage);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::mocks::MockHttpTransport;
    use secrecy::SecretString;

    fn client(transport: Arc<MockHttpTransport>) -> ChatCompletions {
        let config = ProviderConfig::builder()
            .provider("openai")
            .api_key(SecretString::new("sk-test".into()))
            .base_url("https://api.openai.com/v1")
            .model("gpt-4o-mini")
            .build()
            .adapter;
        ChatCompletions::new(Arc::new(config), transport)
    }

    #[test]
    fn test_body_uses_system_and_user_messages() {
        let chat = client(Arc::new(MockHttpTransport::new()));
        let body = chat
            .body(&TranslationRequest::new("Hallo").with_target_language("French"), true)
            .unwrap();

        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert!(body.messages[0].content.contains("into French."));
        assert_eq!(body.messages[1], ChatMessage::user("Hallo"));
        assert!(body.stream);
        assert_eq!(chat.url(), "https://api.openai.com/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_complete_without_content_is_format_error() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.enqueue_json_response(200, r#"{"choices":[]}"#);

        let err = client(transport)
            .complete(&TranslationRequest::new("Hallo"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::UpstreamFormat { .. }));
    }
}
