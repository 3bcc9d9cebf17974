//! Groq streaming client (OpenAI-compatible chat completions).

use async_trait::async_trait;
use chat_core::{ConversationMessage, Role, SYSTEM_PROMPT};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::{json, Value};

use crate::http::build_retry_client;
use crate::provider::{LlmChunk, LlmError, LlmProvider, LlmStream, Result};
use crate::sse::llm_stream_from_sse;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Build the OpenAI-compatible request body, system prompt first.
pub fn build_groq_body(model: &str, messages: &[ConversationMessage]) -> Value {
    let mut wire_messages = vec![json!({
        "role": "system",
        "content": SYSTEM_PROMPT,
    })];

    for message in messages {
        let text = message.text();
        if text.is_empty() {
            continue;
        }
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        wire_messages.push(json!({ "role": role, "content": text }));
    }

    json!({
        "model": model,
        "messages": wire_messages,
        "stream": true,
    })
}

/// Parse one OpenAI-compatible SSE data payload.
pub fn parse_groq_sse_data(data: &str) -> Result<Option<LlmChunk>> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }
    if data == "[DONE]" {
        return Ok(Some(LlmChunk::Done));
    }

    let value: Value = serde_json::from_str(data)
        .map_err(|e| LlmError::Stream(format!("failed to parse Groq SSE data: {e}: {data}")))?;

    let Some(choice) = value.get("choices").and_then(|c| c.as_array()).and_then(|c| c.first())
    else {
        return Ok(None);
    };

    if let Some(content) = choice
        .get("delta")
        .and_then(|d| d.get("content"))
        .and_then(|c| c.as_str())
    {
        if !content.is_empty() {
            return Ok(Some(LlmChunk::Token(content.to_string())));
        }
    }

    if choice.get("finish_reason").and_then(|f| f.as_str()).is_some() {
        return Ok(Some(LlmChunk::Done));
    }

    Ok(None)
}

/// Groq API provider.
pub struct GroqProvider {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_retry_client(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn chat_stream(
        &self,
        messages: &[ConversationMessage],
        model: Option<&str>,
    ) -> Result<LlmStream> {
        if messages.is_empty() {
            return Err(LlmError::InvalidInput(
                "messages must not be empty".to_string(),
            ));
        }

        let model_to_use = model.unwrap_or(&self.model);
        let body = build_groq_body(model_to_use, messages);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;

            if status == 401 || status == 403 {
                return Err(LlmError::Auth(format!(
                    "Groq authentication failed: {body}. Please check your API key."
                )));
            }

            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!("Groq stream started for model {model_to_use}");

        let stream = llm_stream_from_sse(response, |data| match parse_groq_sse_data(data)? {
            // The SSE stream ends on its own after [DONE]; dropping the
            // marker keeps Done out of the token stream proper.
            Some(LlmChunk::Done) => Ok(None),
            other => Ok(other),
        });

        Ok(stream)
    }
}
