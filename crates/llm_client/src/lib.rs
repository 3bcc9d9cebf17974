//! # LLM Client
//!
//! Streaming transport clients for the hosted model APIs. One upstream
//! request is opened per [`LlmProvider::chat_stream`] call; transient
//! failures are retried at the HTTP transport layer, never here.

pub mod factory;
pub mod gemini;
pub mod groq;
pub mod http;
pub mod provider;
pub mod sse;

pub use factory::provider_for_model;
pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use provider::{collect_response, LlmChunk, LlmError, LlmProvider, LlmStream, Result};
