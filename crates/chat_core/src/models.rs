//! Catalog of the hosted models the service can relay to.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub supports_vision: bool,
}

impl ModelInfo {
    fn new(value: &str, label: &str, supports_vision: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            supports_vision,
        }
    }

    /// Gemini model ids are routed to the Gemini transport, everything else
    /// goes to the Groq OpenAI-compatible endpoint.
    pub fn is_gemini(&self) -> bool {
        is_gemini_model(&self.value)
    }
}

pub fn is_gemini_model(value: &str) -> bool {
    value.starts_with("gemini-")
}

pub fn models() -> Vec<ModelInfo> {
    vec![
        ModelInfo::new("gemini-2.0-flash", "Gemini 2.0 Flash", true),
        ModelInfo::new("gemini-1.5-pro", "Gemini 1.5 Pro", true),
        ModelInfo::new("gemini-1.5-flash", "Gemini 1.5 Flash", true),
        ModelInfo::new("gemini-1.5-flash-8b", "Gemini 1.5 Flash 8B", true),
        ModelInfo::new("gemini-pro", "Gemini Pro", false),
        ModelInfo::new("llama-3.3-70b-versatile", "Llama 3.3 70B", false),
        ModelInfo::new("llama-3.1-8b-instant", "Llama 3.1 8B Instant", false),
    ]
}

pub fn model_by_value(value: &str) -> Option<ModelInfo> {
    models().into_iter().find(|m| m.value == value)
}
