//! End-to-end stream decoding against a mock upstream.

use chat_core::ConversationMessage;
use llm_client::{collect_response, GeminiProvider, GroqProvider, LlmError, LlmProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn history() -> Vec<ConversationMessage> {
    vec![ConversationMessage::user("write one line")]
}

#[tokio::test]
async fn gemini_stream_decodes_tokens() {
    let server = MockServer::start().await;

    let sse_body = concat!(
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hello \"}],\"role\":\"model\"}}]}\n\n",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"world\"}],\"role\":\"model\"}}]}\n\n",
        "data: {\"candidates\":[{\"content\":{\"parts\":[],\"role\":\"model\"},\"finishReason\":\"STOP\"}]}\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:streamGenerateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body),
        )
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key").with_base_url(server.uri());
    let stream = provider.chat_stream(&history(), None).await.unwrap();
    let text = collect_response(stream).await.unwrap();

    assert_eq!(text, "Hello world");
}

#[tokio::test]
async fn gemini_surfaces_upstream_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:streamGenerateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key").with_base_url(server.uri());
    let err = provider.chat_stream(&history(), None).await.err().unwrap();

    match err {
        LlmError::Api { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn gemini_rejects_empty_history_before_io() {
    // No mock server mounted: the call must fail before any request.
    let provider = GeminiProvider::new("test-key").with_base_url("http://127.0.0.1:1");
    let err = provider.chat_stream(&[], None).await.err().unwrap();
    assert!(matches!(err, LlmError::InvalidInput(_)));
}

#[tokio::test]
async fn groq_stream_decodes_deltas_until_done() {
    let server = MockServer::start().await;

    let sse_body = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Once \"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"upon\"},\"finish_reason\":null}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body),
        )
        .mount(&server)
        .await;

    let provider = GroqProvider::new("test-key").with_base_url(server.uri());
    let stream = provider.chat_stream(&history(), None).await.unwrap();
    let text = collect_response(stream).await.unwrap();

    assert_eq!(text, "Once upon");
}

#[tokio::test]
async fn groq_auth_failure_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let provider = GroqProvider::new("wrong").with_base_url(server.uri());
    let err = provider.chat_stream(&history(), None).await.err().unwrap();
    assert!(matches!(err, LlmError::Auth(_)));
}
