//! Store contract shared by both backends.

use async_trait::async_trait;
use chat_core::ConversationMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One persisted conversation. Messages are replaced wholesale on update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedChat {
    pub id: String,
    pub messages: Vec<ConversationMessage>,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conversation history persistence.
///
/// Both backends satisfy the same ordering contract: listings come back
/// sorted by `updated_at` descending, and a page shorter than `page_size`
/// means there are no further pages.
#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    /// All chats, most recently updated first.
    async fn list(&self) -> Result<Vec<SavedChat>>;

    /// One offset-limited window of [`list`](Self::list).
    async fn list_page(&self, page_size: usize, offset: usize) -> Result<Vec<SavedChat>>;

    async fn get_by_id(&self, id: &str) -> Result<SavedChat>;

    /// Create a new record with a fresh id. Saving an empty message list is
    /// a no-op that returns `Ok(None)`.
    async fn save(
        &self,
        messages: &[ConversationMessage],
        model: &str,
    ) -> Result<Option<SavedChat>>;

    /// Replace an existing record's messages and model, bumping
    /// `updated_at`. Returns `false` when the id is unknown.
    async fn update(
        &self,
        id: &str,
        messages: &[ConversationMessage],
        model: &str,
    ) -> Result<bool>;

    async fn delete(&self, id: &str) -> Result<bool>;

    async fn clear_all(&self) -> Result<bool>;
}
