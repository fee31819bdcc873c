//! Integration tests for both Gemini adapters.

use bytes::Bytes;
use futures::StreamExt;
use integrations_translation::mocks::MockHttpTransport;
use integrations_translation::transport::HttpMethod;
use integrations_translation::{
    collect_text, AdapterFactory, AdapterKind, ChunkSimulator, FixedPacing, GeminiOpenAiCompatibleAdapter,
    NativeGeminiAdapter, ProviderConfig, SimulatorConfig, StreamChunk, TranslateError, TranslationAdapter,
    TranslationRequest, Usage,
};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const NATIVE_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const COMPAT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

fn gemini_config(base_url: &str) -> ProviderConfig {
    ProviderConfig::builder()
        .provider("gemini")
        .api_key(SecretString::new("g-key".into()))
        .base_url(base_url)
        .model("gemini-2.0-flash")
        .max_tokens(2048)
        .build()
}

fn fixed_simulator(delay_ms: u64) -> Arc<ChunkSimulator> {
    Arc::new(ChunkSimulator::new(
        SimulatorConfig::default(),
        Arc::new(FixedPacing {
            window: 5,
            delay: Duration::from_millis(delay_ms),
        }),
    ))
}

fn native(transport: &Arc<MockHttpTransport>) -> NativeGeminiAdapter {
    NativeGeminiAdapter::new(gemini_config(NATIVE_BASE_URL).adapter, transport.clone())
        .unwrap()
        .with_simulator(fixed_simulator(100))
}

fn compat(transport: &Arc<MockHttpTransport>) -> GeminiOpenAiCompatibleAdapter {
    GeminiOpenAiCompatibleAdapter::new(gemini_config(COMPAT_BASE_URL).adapter, transport.clone())
        .unwrap()
        .with_simulator(fixed_simulator(100))
}

fn native_object(text: &str, finish: Option<&str>) -> String {
    let mut candidate = json!({"content": {"role": "model", "parts": [{"text": text}]}});
    if let Some(reason) = finish {
        candidate["finishReason"] = json!(reason);
    }
    json!({"candidates": [candidate]}).to_string()
}

fn sse_delta(content: &str) -> Bytes {
    Bytes::from(format!(
        "data: {}\n\n",
        json!({"choices": [{"index": 0, "delta": {"content": content}}]})
    ))
}

fn paragraphs(count: usize) -> String {
    (0..count)
        .map(|i| format!("Paragraph {i}: {}", "Lorem ipsum dolor sit amet. ".repeat(3).trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

async fn timed_collect(stream: integrations_translation::ChunkStream) -> Vec<(Duration, StreamChunk)> {
    let start = Instant::now();
    let mut stream = stream;
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.push((start.elapsed(), chunk.unwrap()));
    }
    out
}

#[tokio::test]
async fn test_native_stream_emits_each_object() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    let usage = r#"{"candidates":[{"content":{"parts":[{"text":"jour"}]},"finishReason":"STOP"}],
        "usageMetadata":{"promptTokenCount":12,"candidatesTokenCount":2,"totalTokenCount":14}}"#;
    transport.enqueue_streaming_response(vec![
        Bytes::from(format!("[{},\n", native_object("Bon", None))),
        Bytes::from(format!("{}]", usage)),
    ]);

    // Act
    let chunks: Vec<_> = native(&transport)
        .translate_stream(TranslationRequest::new("Good day"), CancellationToken::new())
        .collect()
        .await;

    // Assert
    assert_eq!(
        chunks,
        vec![
            Ok(StreamChunk::delta("Bon")),
            Ok(StreamChunk::delta("jour")),
            Ok(StreamChunk::complete(Some(Usage {
                prompt_tokens: Some(12),
                completion_tokens: Some(2),
                total_tokens: 14,
            }))),
        ]
    );
}

#[tokio::test]
async fn test_native_objects_without_separator_in_one_read() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_streaming_response(vec![Bytes::from(format!(
        "{}{}",
        native_object("Bon", None),
        native_object("jour", Some("STOP"))
    ))]);

    let text = collect_text(
        native(&transport).translate_stream(TranslationRequest::new("Good day"), CancellationToken::new()),
    )
    .await
    .unwrap();

    assert_eq!(text, "Bonjour");
}

#[tokio::test]
async fn test_native_request_shape() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_streaming_response(vec![Bytes::from(native_object("Hola", Some("STOP")))]);

    let request = TranslationRequest::new("Hello").with_target_language("Spanish");
    let _: Vec<_> = native(&transport)
        .translate_stream(request, CancellationToken::new())
        .collect()
        .await;

    transport.verify_request(
        0,
        HttpMethod::Post,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:streamGenerateContent",
    );
    transport.verify_header(0, "x-goog-api-key", "g-key");
    assert!(transport.last_request().unwrap().headers.get("authorization").is_none());

    let body = transport.last_request_json().unwrap();
    assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    assert_eq!(body["contents"][0]["role"], "user");
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("into Spanish."));
    assert!(prompt.ends_with("\n\nHello"));
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
}

#[tokio::test(start_paused = true)]
async fn test_native_single_finishing_object_is_simulated() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    let text = paragraphs(3);
    transport.enqueue_streaming_response(vec![Bytes::from(native_object(&text, Some("STOP")))]);

    // Act
    let chunks = timed_collect(
        native(&transport).translate_stream(TranslationRequest::new("Hallo"), CancellationToken::new()),
    )
    .await;

    // Assert
    assert_eq!(chunks.len(), 4);
    let rebuilt: String = chunks.iter().map(|(_, c)| c.content.as_str()).collect();
    assert_eq!(rebuilt, text);
    let arrivals: Vec<Duration> = chunks.iter().map(|(at, _)| *at).collect();
    assert_eq!(
        arrivals,
        vec![
            Duration::ZERO,
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(200),
        ]
    );
    let (_, last) = chunks.last().unwrap();
    assert!(last.is_complete);
    assert_eq!(last.usage, Some(Usage::total(u32::try_from(text.chars().count()).unwrap())));
}

#[tokio::test]
async fn test_native_trailing_fragment_still_completes() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_streaming_response(vec![
        Bytes::from(native_object("Bon", None)),
        Bytes::from(r#"{"candidates":[{"content":"#),
    ]);

    let chunks: Vec<_> = native(&transport)
        .translate_stream(TranslationRequest::new("Good day"), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(
        chunks,
        vec![Ok(StreamChunk::delta("Bon")), Ok(StreamChunk::complete(None))]
    );
}

#[tokio::test]
async fn test_native_http_error() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_streaming_status(
        429,
        r#"[{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}]"#,
    );

    let chunks: Vec<_> = native(&transport)
        .translate_stream(TranslationRequest::new("Hallo"), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(
        chunks,
        vec![Err(TranslateError::UpstreamHttp {
            status: 429,
            message: "Resource has been exhausted".to_string(),
        })]
    );
}

#[tokio::test]
async fn test_native_error_object_mid_stream() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_streaming_response(vec![
        Bytes::from(format!("[{},\n", native_object("Bon", None))),
        Bytes::from(r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}]"#),
    ]);

    let chunks: Vec<_> = native(&transport)
        .translate_stream(TranslationRequest::new("Good day"), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(
        chunks,
        vec![
            Ok(StreamChunk::delta("Bon")),
            Err(TranslateError::UpstreamHttp {
                status: 429,
                message: "Resource has been exhausted".to_string(),
            }),
        ]
    );
}

#[tokio::test]
async fn test_native_translate() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(
        200,
        r#"{"candidates":[{"content":{"parts":[{"text":"Bonjour"}],"role":"model"},"finishReason":"STOP"}],
            "usageMetadata":{"promptTokenCount":9,"candidatesTokenCount":2,"totalTokenCount":11}}"#,
    );

    let response = native(&transport)
        .translate(&TranslationRequest::new("Good day"))
        .await
        .unwrap();

    assert_eq!(response.content, "Bonjour");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(11));
    transport.verify_request(0, HttpMethod::Post, "/models/gemini-2.0-flash:generateContent");
}

#[tokio::test]
async fn test_native_reconstruction_matches_translate() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(
        200,
        &json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "Bonjour, le monde."}]}, "finishReason": "STOP"}]})
            .to_string(),
    );
    transport.enqueue_streaming_response(vec![
        Bytes::from(format!("[{},\n", native_object("Bonjour,", None))),
        Bytes::from(format!("{},\n", native_object(" le ", None))),
        Bytes::from(format!("{}]", native_object("monde.", Some("STOP")))),
    ]);
    let adapter = native(&transport);

    // Act
    let translated = adapter.translate(&TranslationRequest::new("Hello, world.")).await.unwrap();
    let streamed = collect_text(adapter.translate_stream(TranslationRequest::new("Hello, world."), CancellationToken::new()))
        .await
        .unwrap();

    // Assert
    assert_eq!(streamed, translated.content);
    transport.verify_request(1, HttpMethod::Post, "/models/gemini-2.0-flash:streamGenerateContent");
}

#[tokio::test]
async fn test_native_translate_error_body_with_ok_status() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, r#"{"error":{"code":503,"message":"The model is overloaded."}}"#);

    let err = native(&transport)
        .translate(&TranslationRequest::new("Good day"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TranslateError::UpstreamHttp {
            status: 503,
            message: "The model is overloaded.".to_string(),
        }
    );
}

#[tokio::test]
async fn test_native_translate_without_candidates() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, r#"{"candidates":[]}"#);

    let err = native(&transport)
        .translate(&TranslationRequest::new("Good day"))
        .await
        .unwrap_err();

    assert!(matches!(err, TranslateError::UpstreamFormat { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_compat_atomic_payload_is_simulated() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    let text = paragraphs(5);
    assert!(text.chars().count() >= 450);
    transport.enqueue_streaming_response(vec![
        sse_delta(&text),
        Bytes::from("data: {\"choices\":[],\"usage\":{\"prompt_tokens\":30,\"completion_tokens\":90,\"total_tokens\":120}}\n\n"),
        Bytes::from("data: [DONE]\n\n"),
    ]);

    // Act
    let chunks = timed_collect(
        compat(&transport).translate_stream(TranslationRequest::new("Hallo"), CancellationToken::new()),
    )
    .await;

    // Assert
    let (terminal, deltas) = chunks.split_last().unwrap();
    assert!(deltas.len() >= 2);
    assert_eq!(deltas.iter().map(|(_, c)| c.content.as_str()).collect::<String>(), text);
    for pair in deltas.windows(2) {
        assert_eq!(pair[1].0 - pair[0].0, Duration::from_millis(100));
    }
    assert!(terminal.1.is_complete);
    assert_eq!(terminal.1.usage.map(|u| u.total_tokens), Some(120));
}

#[tokio::test(start_paused = true)]
async fn test_compat_default_pacing_stays_within_bounds() {
    let transport = Arc::new(MockHttpTransport::new());
    let text = paragraphs(6);
    transport.enqueue_streaming_response(vec![sse_delta(&text), Bytes::from("data: [DONE]\n\n")]);
    let adapter = AdapterFactory::new()
        .with_transport(transport.clone())
        .create_adapter(&gemini_config(COMPAT_BASE_URL))
        .unwrap();
    assert_eq!(adapter.kind(), AdapterKind::GeminiOpenAiCompatible);

    let chunks = timed_collect(adapter.translate_stream(TranslationRequest::new("Hallo"), CancellationToken::new())).await;

    let (_, deltas) = chunks.split_last().unwrap();
    assert_eq!(deltas.len(), 6);
    for pair in deltas.windows(2) {
        let gap = pair[1].0 - pair[0].0;
        assert!(
            gap >= Duration::from_millis(80) && gap <= Duration::from_millis(120),
            "gap {gap:?}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_compat_real_stream_passes_through() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_timed_streaming_response(vec![
        (Duration::from_millis(100), sse_delta("Hel")),
        (Duration::from_millis(100), sse_delta("lo")),
        (Duration::from_millis(100), sse_delta(" World")),
        (Duration::from_millis(100), Bytes::from("data: [DONE]\n\n")),
    ]);

    // Act
    let chunks = timed_collect(
        compat(&transport).translate_stream(TranslationRequest::new("Hallo"), CancellationToken::new()),
    )
    .await;

    // Assert
    let contents: Vec<(Duration, &str)> = chunks.iter().map(|(at, c)| (*at, c.content.as_str())).collect();
    assert_eq!(
        contents,
        vec![
            (Duration::from_millis(200), "Hello"),
            (Duration::from_millis(300), " World"),
            (Duration::from_millis(400), ""),
        ]
    );
    assert!(chunks[2].1.is_complete);
}

#[tokio::test(start_paused = true)]
async fn test_compat_burst_of_deltas_is_treated_as_atomic() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_streaming_response(vec![
        sse_delta("Bon"),
        sse_delta("jour"),
        Bytes::from("data: [DONE]\n\n"),
    ]);

    let chunks = timed_collect(
        compat(&transport).translate_stream(TranslationRequest::new("Good day"), CancellationToken::new()),
    )
    .await;

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].1, StreamChunk::delta("Bonjour"));
    assert_eq!(chunks[1].1, StreamChunk::complete(Some(Usage::total(7))));
}

#[tokio::test]
async fn test_compat_reconstruction_matches_translate() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    let text = paragraphs(4);
    transport.enqueue_json_response(
        200,
        &json!({"choices": [{"message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]}).to_string(),
    );
    transport.enqueue_streaming_response(vec![sse_delta(&text), Bytes::from("data: [DONE]\n\n")]);
    let adapter = GeminiOpenAiCompatibleAdapter::new(gemini_config(COMPAT_BASE_URL).adapter, transport.clone())
        .unwrap()
        .with_simulator(fixed_simulator(0));

    // Act
    let translated = adapter.translate(&TranslationRequest::new("Hallo")).await.unwrap();
    let streamed = collect_text(adapter.translate_stream(TranslationRequest::new("Hallo"), CancellationToken::new()))
        .await
        .unwrap();

    // Assert
    assert_eq!(streamed, translated.content);
    transport.verify_request(1, HttpMethod::Post, "/v1beta/openai/chat/completions");
    transport.verify_header(1, "authorization", "Bearer g-key");
}
