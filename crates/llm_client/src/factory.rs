//! Model id -> provider resolution.

use std::sync::Arc;

use chat_core::{models::is_gemini_model, Config};

use crate::gemini::GeminiProvider;
use crate::groq::GroqProvider;
use crate::provider::{LlmError, LlmProvider, Result};

/// Resolve the provider for a model id.
///
/// `gemini-*` ids go to the Gemini transport, everything else to Groq.
/// A missing API key fails here, before any upstream I/O.
pub fn provider_for_model(config: &Config, model: &str) -> Result<Arc<dyn LlmProvider>> {
    if is_gemini_model(model) {
        let api_key = config
            .gemini_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                LlmError::Auth("Gemini is not configured. Set GEMINI_API_KEY.".to_string())
            })?;
        Ok(Arc::new(GeminiProvider::new(api_key).with_model(model)))
    } else {
        let api_key = config
            .groq_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                LlmError::Auth("Groq is not configured. Set GROQ_API_KEY.".to_string())
            })?;
        Ok(Arc::new(GroqProvider::new(api_key).with_model(model)))
    }
}
