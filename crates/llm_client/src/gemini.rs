//! Google Gemini streaming client.
//!
//! Gemini speaks its own shape: messages are "contents", the assistant role
//! is "model", and the system prompt rides in a separate `systemInstruction`
//! field. Each SSE event carries one JSON response object:
//! ```text
//! data: {"candidates":[{"content":{"parts":[{"text":"Hello"}],"role":"model"}}]}
//! ```

use async_trait::async_trait;
use chat_core::{ConversationMessage, Role, SYSTEM_PROMPT};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::build_retry_client;
use crate::provider::{LlmChunk, LlmError, LlmProvider, LlmStream, Result};
use crate::sse::llm_stream_from_sse;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Map a sanitized history onto the Gemini wire shape. Messages with no
/// text content are dropped (Gemini rejects empty parts arrays).
pub fn build_gemini_request(messages: &[ConversationMessage]) -> GeminiRequest {
    let contents = messages
        .iter()
        .filter_map(|message| {
            let text = message.text();
            if text.is_empty() {
                return None;
            }
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            Some(GeminiContent {
                role: Some(role.to_string()),
                parts: vec![GeminiPart { text: Some(text) }],
            })
        })
        .collect();

    GeminiRequest {
        contents,
        system_instruction: Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(SYSTEM_PROMPT.to_string()),
            }],
        }),
        generation_config: None,
    }
}

/// Parse a single Gemini SSE data payload into an optional [`LlmChunk`].
///
/// Returns `Ok(None)` for keep-alive or metadata-only events.
pub fn parse_gemini_sse_data(data: &str) -> Result<Option<LlmChunk>> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(data)
        .map_err(|e| LlmError::Stream(format!("failed to parse Gemini SSE data: {e}: {data}")))?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown Gemini API error");
        return Err(LlmError::Api {
            status: error.get("code").and_then(|c| c.as_u64()).unwrap_or(500) as u16,
            body: message.to_string(),
        });
    }

    let Some(candidates) = value.get("candidates").and_then(|c| c.as_array()) else {
        return Ok(None);
    };
    let Some(candidate) = candidates.first() else {
        return Ok(None);
    };

    let mut text = String::new();
    if let Some(parts) = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        for part in parts {
            if let Some(fragment) = part.get("text").and_then(|t| t.as_str()) {
                text.push_str(fragment);
            }
        }
    }

    if text.is_empty() {
        // finishReason-only frames end the candidate.
        if candidate.get("finishReason").is_some() {
            return Ok(Some(LlmChunk::Done));
        }
        return Ok(None);
    }

    Ok(Some(LlmChunk::Token(text)))
}

/// Google Gemini API provider.
pub struct GeminiProvider {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_retry_client(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: chat_core::DEFAULT_MODEL.to_string(),
        }
    }

    /// Set a custom base URL (e.g., for proxies or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, model, self.api_key
        )
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
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
        let request = build_gemini_request(messages);

        let response = self
            .client
            .post(self.stream_url(model_to_use))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;

            if status == 401 || status == 403 {
                return Err(LlmError::Auth(format!(
                    "Gemini authentication failed: {body}. Please check your API key."
                )));
            }

            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!("Gemini stream started for model {model_to_use}");

        Ok(llm_stream_from_sse(response, parse_gemini_sse_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_url_construction() {
        let provider = GeminiProvider::new("my_key")
            .with_base_url("https://test.api.com/v1beta")
            .with_model("gemini-custom");

        assert_eq!(
            provider.stream_url(&provider.model),
            "https://test.api.com/v1beta/models/gemini-custom:streamGenerateContent?alt=sse&key=my_key"
        );
    }

    #[test]
    fn test_request_maps_roles_and_attaches_system_prompt() {
        let messages = vec![
            ConversationMessage::user("hello"),
            ConversationMessage::assistant("hi there"),
        ];
        let request = build_gemini_request(&messages);

        assert_eq!(request.contents.len(), 2);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[1].role.as_deref(), Some("model"));

        let system = request.system_instruction.unwrap();
        assert_eq!(system.parts[0].text.as_deref(), Some(SYSTEM_PROMPT));
    }

    #[test]
    fn test_request_drops_textless_messages() {
        let mut empty = ConversationMessage::user("");
        empty.parts.clear();
        let messages = vec![empty, ConversationMessage::user("hello")];

        let request = build_gemini_request(&messages);
        assert_eq!(request.contents.len(), 1);
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = build_gemini_request(&[ConversationMessage::user("hi")]);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("systemInstruction").is_some());
    }

    #[test]
    fn test_parse_token_event() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"}],"role":"model"}}]}"#;
        let chunk = parse_gemini_sse_data(data).unwrap();
        assert_eq!(chunk, Some(LlmChunk::Token("Hello".to_string())));
    }

    #[test]
    fn test_parse_finish_event() {
        let data = r#"{"candidates":[{"content":{"parts":[],"role":"model"},"finishReason":"STOP"}]}"#;
        let chunk = parse_gemini_sse_data(data).unwrap();
        assert_eq!(chunk, Some(LlmChunk::Done));
    }

    #[test]
    fn test_parse_skips_empty_events() {
        assert_eq!(parse_gemini_sse_data("").unwrap(), None);
        assert_eq!(parse_gemini_sse_data("{}").unwrap(), None);
    }

    #[test]
    fn test_parse_surfaces_api_errors() {
        let data = r#"{"error":{"code":429,"message":"quota exceeded"}}"#;
        let err = parse_gemini_sse_data(data).unwrap_err();
        match err {
            LlmError::Api { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = parse_gemini_sse_data("not json").unwrap_err();
        assert!(matches!(err, LlmError::Stream(_)));
    }
}
