//! The two model-facing endpoints: one-shot streaming chat and the chunked
//! continuation.

use actix_web::{post, web, HttpResponse};
use bytes::Bytes;
use chat_core::sanitize_messages;
use futures_util::StreamExt;
use llm_client::LlmChunk;
use serde_json::json;

use crate::dto::{ChatRequest, ContinuationRequest};
use crate::error::AppError;
use crate::server::AppState;
use crate::services::continuation::{continuation_stream, ContinuationOptions};

/// Configure chat routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(chat).service(chat_continuation);
}

/// Relay one user turn to the model and stream the response back as SSE
/// frames (`data: {"text": ...}` per token, `data: [DONE]` at the end).
#[post("/chat")]
pub async fn chat(
    request: web::Json<ChatRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ChatRequest {
        messages,
        selected_model,
    } = request.into_inner();

    if messages.is_empty() {
        return Err(AppError::InvalidInput(
            "messages must not be empty".to_string(),
        ));
    }

    let model = selected_model.unwrap_or_else(|| state.config.default_model().to_string());
    let sanitized = sanitize_messages(&messages);

    let provider = state.providers.provider_for(&model)?;
    let mut stream = provider.chat_stream(&sanitized, None).await?;

    let body = async_stream::stream! {
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(LlmChunk::Token(token)) => {
                    let frame = json!({ "text": token });
                    yield Ok::<_, actix_web::Error>(Bytes::from(format!("data: {frame}\n\n")));
                }
                Ok(LlmChunk::Done) => break,
                Err(err) => {
                    log::error!("chat stream error: {err}");
                    let frame = json!({ "error": err.to_string() });
                    yield Ok(Bytes::from(format!("data: {frame}\n\n")));
                    break;
                }
            }
        }
        yield Ok(Bytes::from("data: [DONE]\n\n"));
    };

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("cache-control", "no-store"))
        .streaming(body))
}

/// Assemble long-form output by looping bounded continuations. The response
/// is a plain text stream of concatenated chunks with inline bracketed
/// markers; setup failures are still JSON errors.
#[post("/chat/continuation")]
pub async fn chat_continuation(
    request: web::Json<ContinuationRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ContinuationRequest {
        messages,
        selected_model,
        target_words,
        chunk_words,
        max_iterations,
    } = request.into_inner();

    if messages.is_empty() {
        return Err(AppError::InvalidInput(
            "messages must be provided".to_string(),
        ));
    }

    let options = ContinuationOptions::from_request(target_words, chunk_words, max_iterations)?;
    let model = selected_model.unwrap_or_else(|| state.config.default_model().to_string());
    let sanitized = sanitize_messages(&messages);

    let provider = state.providers.provider_for(&model)?;

    let body = continuation_stream(provider, sanitized, options)
        .map(Ok::<_, actix_web::Error>);

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(("cache-control", "no-store"))
        .streaming(body))
}
