//! Provider trait and the chunk stream it produces.

use std::pin::Pin;

use async_trait::async_trait;
use chat_core::ConversationMessage;
use futures::Stream;
use futures_util::StreamExt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest_middleware::Error),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmChunk {
    Token(String),
    Done,
}

pub type LlmStream = Pin<Box<dyn Stream<Item = Result<LlmChunk>> + Send>>;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Open one streaming completion request for a sanitized history.
    ///
    /// Fails with [`LlmError::InvalidInput`] before any I/O when `messages`
    /// is empty. `model` overrides the provider default.
    async fn chat_stream(
        &self,
        messages: &[ConversationMessage],
        model: Option<&str>,
    ) -> Result<LlmStream>;
}

/// Drain a stream into the complete response text.
///
/// The continuation orchestrator works a full chunk at a time, so it buffers
/// each upstream response through this before emitting.
pub async fn collect_response(mut stream: LlmStream) -> Result<String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk? {
            LlmChunk::Token(token) => text.push_str(&token),
            LlmChunk::Done => break,
        }
    }
    Ok(text)
}
