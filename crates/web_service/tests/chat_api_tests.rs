//! HTTP-level tests for the chat endpoints, with a scripted model transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use actix_web::{test, web, App};
use async_trait::async_trait;
use chat_core::{Config, ConversationMessage};
use history_store::FileHistoryStore;
use llm_client::{LlmChunk, LlmProvider, LlmStream};
use serde_json::json;
use tempfile::TempDir;
use web_service::server::{app_config, AppState, ProviderResolver};

/// Transport that replays a script of responses; each response is emitted
/// as a pair of token chunks.
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, llm_client::LlmError>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<String, llm_client::LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat_stream(
        &self,
        messages: &[ConversationMessage],
        _model: Option<&str>,
    ) -> llm_client::Result<LlmStream> {
        assert!(!messages.is_empty(), "transport must never see an empty history");

        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("spare filler text".to_string()));

        match next {
            Ok(text) => {
                let midpoint = text.len() / 2;
                let (head, tail) = text.split_at(midpoint);
                let chunks = vec![
                    Ok(LlmChunk::Token(head.to_string())),
                    Ok(LlmChunk::Token(tail.to_string())),
                    Ok(LlmChunk::Done),
                ];
                Ok(Box::pin(futures_util::stream::iter(chunks)))
            }
            Err(err) => Err(err),
        }
    }
}

struct ScriptedResolver(Arc<ScriptedProvider>);

impl ProviderResolver for ScriptedResolver {
    fn provider_for(&self, _model: &str) -> llm_client::Result<Arc<dyn LlmProvider>> {
        Ok(self.0.clone())
    }
}

fn app_state(dir: &TempDir, provider: Arc<ScriptedProvider>) -> web::Data<AppState> {
    let history = Arc::new(FileHistoryStore::new(dir.path().join("history.json")));
    web::Data::new(AppState::new(
        Config::default(),
        history,
        Arc::new(ScriptedResolver(provider)),
    ))
}

fn user_turn(text: &str) -> serde_json::Value {
    json!({ "role": "user", "parts": [{ "type": "text", "text": text }] })
}

#[actix_web::test]
async fn chat_rejects_empty_messages() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(&dir, ScriptedProvider::new(vec![]));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "messages": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("messages"));
}

#[actix_web::test]
async fn chat_streams_sse_frames_and_done_marker() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![Ok("Once upon a time".to_string())]);
    let state = app_state(&dir, provider);
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "messages": [user_turn("tell me a story")] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.contains("data: {\"text\":"));
    assert!(text.ends_with("data: [DONE]\n\n"));
}

#[actix_web::test]
async fn chat_strips_reasoning_before_calling_transport() {
    // The scripted provider asserts on non-empty histories; this test relies
    // on the sanitizer leaving the single text message intact.
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![Ok("fine".to_string())]);
    let state = app_state(&dir, provider);
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let message = json!({
        "role": "user",
        "reasoning": "private trace",
        "parts": [
            { "type": "text", "text": "hello" },
            { "type": "reasoning", "text": "more trace" },
        ],
    });

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "messages": [message] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn continuation_rejects_empty_messages() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(&dir, ScriptedProvider::new(vec![]));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/chat/continuation")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn continuation_rejects_zero_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(&dir, ScriptedProvider::new(vec![]));
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/chat/continuation")
        .set_json(json!({ "messages": [user_turn("go")], "maxIterations": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn continuation_streams_chunks_until_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![
        Ok("chapter one text".to_string()),
        Ok("the end\n<END_OF_OUTPUT>\n".to_string()),
    ]);
    let state = app_state(&dir, provider);
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/chat/continuation")
        .set_json(json!({ "messages": [user_turn("write a novel")], "chunkWords": 10 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/plain; charset=utf-8"
    );

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.starts_with("chapter one text"));
    assert!(text.contains("<END_OF_OUTPUT>"));
    assert!(text.ends_with("\n\n[generation complete]\n"));
}

#[actix_web::test]
async fn continuation_reports_upstream_failure_inline() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![
        Ok("good first chunk".to_string()),
        Err(llm_client::LlmError::Api {
            status: 500,
            body: "model crashed".to_string(),
        }),
    ]);
    let state = app_state(&dir, provider);
    let app = test::init_service(App::new().app_data(state).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/chat/continuation")
        .set_json(json!({ "messages": [user_turn("write")], "maxIterations": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // The failure happens mid-stream, so the response itself is still 200.
    assert_eq!(resp.status(), 200);

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.starts_with("good first chunk"));
    assert!(text.contains("[error chunk 2]: 500 model crashed"));
}
