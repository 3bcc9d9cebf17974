//! Service configuration, loaded from `config.toml` with environment
//! variable overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const CONFIG_FILE_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API key for the Gemini transport.
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// API key for the Groq transport.
    #[serde(default)]
    pub groq_api_key: Option<String>,
    /// Postgres connection string for the remote history backend. When
    /// unset the file-backed store is used.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Model used when a request does not name one.
    #[serde(default)]
    pub default_model: Option<String>,
    /// Location of the file-backed history document.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

impl Config {
    /// Load from `config.toml` (when present), then apply environment
    /// variable overrides.
    pub fn new() -> Self {
        let mut config = Config::default();

        if std::path::Path::new(CONFIG_FILE_PATH).exists() {
            if let Ok(content) = std::fs::read_to_string(CONFIG_FILE_PATH) {
                match toml::from_str::<Config>(&content) {
                    Ok(file_config) => config = file_config,
                    Err(err) => log::warn!("ignoring malformed {CONFIG_FILE_PATH}: {err}"),
                }
            }
        }

        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.gemini_api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            if !key.is_empty() {
                self.groq_api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database_url = Some(url);
            }
        }
        if let Ok(model) = std::env::var("CHAT_DEFAULT_MODEL") {
            if !model.is_empty() {
                self.default_model = Some(model);
            }
        }
        if let Ok(path) = std::env::var("CHAT_HISTORY_FILE") {
            if !path.is_empty() {
                self.history_file = Some(PathBuf::from(path));
            }
        }
    }

    pub fn default_model(&self) -> &str {
        self.default_model
            .as_deref()
            .unwrap_or(crate::models::DEFAULT_MODEL)
    }

    /// Path for the file-backed history store.
    pub fn history_file(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("chat-history.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_fallback() {
        let config = Config::default();
        assert_eq!(config.default_model(), crate::models::DEFAULT_MODEL);

        let config = Config {
            default_model: Some("llama-3.1-8b-instant".to_string()),
            ..Config::default()
        };
        assert_eq!(config.default_model(), "llama-3.1-8b-instant");
    }

    #[test]
    fn test_history_file_default() {
        let config = Config::default();
        assert_eq!(config.history_file(), PathBuf::from("chat-history.json"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config {
            gemini_api_key: Some("key".to_string()),
            database_url: Some("postgres://localhost/chats".to_string()),
            ..Config::default()
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.gemini_api_key.as_deref(), Some("key"));
        assert_eq!(parsed.database_url.as_deref(), Some("postgres://localhost/chats"));
    }
}
