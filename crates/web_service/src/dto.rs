//! Request and response bodies for the HTTP surface.

use chat_core::ConversationMessage;
use chat_state::SessionState;
use history_store::SavedChat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
    #[serde(default, alias = "selectedModel")]
    pub selected_model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContinuationRequest {
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
    #[serde(default, alias = "selectedModel")]
    pub selected_model: Option<String>,
    #[serde(default, alias = "targetWords")]
    pub target_words: Option<u64>,
    #[serde(default, alias = "chunkWords")]
    pub chunk_words: Option<u64>,
    #[serde(default, alias = "maxIterations")]
    pub max_iterations: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SaveChatRequest {
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SaveChatResponse {
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<SavedChat>,
}

#[derive(Debug, Serialize)]
pub struct UpdateChatResponse {
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteChatResponse {
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct SwitchModelRequest {
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceMessagesRequest {
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
}

/// Snapshot of the session controller, returned by the session endpoints.
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub state: SessionState,
    pub model: String,
    pub message_count: usize,
    /// Display title derived from the first user message.
    pub title: String,
}
