//! # Chat Core
//!
//! Core types shared across the chat service: the conversation message
//! model, the reasoning sanitizer, the model catalog and service
//! configuration.

pub mod config;
pub mod message;
pub mod models;
pub mod prompt;

// Re-exports
pub use config::Config;
pub use message::{
    sanitize_messages, conversation_title, ConversationMessage, MessagePart, Role,
};
pub use models::{model_by_value, models, ModelInfo, DEFAULT_MODEL};
pub use prompt::SYSTEM_PROMPT;
