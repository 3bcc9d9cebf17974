//! Conversation message model and the reasoning sanitizer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One content fragment of a message. Order within `parts` is render order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text {
        text: String,
    },
    File {
        url: String,
        media_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Display-only reasoning trace. Must never reach the model transport.
    Reasoning {
        text: String,
    },
}

impl MessagePart {
    pub fn is_reasoning(&self) -> bool {
        matches!(self, MessagePart::Reasoning { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    #[serde(default = "generate_id")]
    pub id: String,
    pub role: Role,
    pub parts: Vec<MessagePart>,
    /// Legacy top-level reasoning field some clients still send.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

impl ConversationMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            role: Role::User,
            parts: vec![MessagePart::Text { text: text.into() }],
            reasoning: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            role: Role::Assistant,
            parts: vec![MessagePart::Text { text: text.into() }],
            reasoning: None,
        }
    }

    /// Concatenated text content, skipping non-text parts.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            if let MessagePart::Text { text } = part {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
        }
        out
    }
}

/// Strip display-only reasoning annotations before a history is sent
/// upstream. Returns new copies; the input is left untouched.
pub fn sanitize_messages(messages: &[ConversationMessage]) -> Vec<ConversationMessage> {
    messages
        .iter()
        .map(|message| {
            let mut copy = message.clone();
            if copy.reasoning.take().is_some() {
                log::warn!("stripped top-level reasoning field from message {}", copy.id);
            }
            copy.parts.retain(|part| !part.is_reasoning());
            copy
        })
        .collect()
}

/// Derive a short display title from the first user text in a transcript.
pub fn conversation_title(messages: &[ConversationMessage]) -> String {
    const TITLE_WORDS: usize = 5;

    let text = messages
        .iter()
        .find(|m| m.role == Role::User && m.parts.iter().any(|p| matches!(p, MessagePart::Text { .. })))
        .map(|m| m.text())
        .unwrap_or_default();

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return "New Chat".to_string();
    }

    let title = words[..words.len().min(TITLE_WORDS)].join(" ");
    if words.len() > TITLE_WORDS {
        format!("{title}...")
    } else {
        title
    }
}
