//! File-backed history store: one JSON document, most-recent-10 retention.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chat_core::ConversationMessage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{ChatHistoryStore, SavedChat};

/// Retention cap: only the most recently updated chats survive.
pub const MAX_CHATS: usize = 10;

/// Document format version. A mismatch resets the store to empty.
pub const STORAGE_VERSION: u32 = 1;

/// How many chats to evict when a persist fails before the single retry.
const EVICT_ON_WRITE_FAILURE: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryDocument {
    chats: Vec<SavedChat>,
    version: u32,
}

impl Default for HistoryDocument {
    fn default() -> Self {
        Self {
            chats: Vec::new(),
            version: STORAGE_VERSION,
        }
    }
}

/// File-backed [`ChatHistoryStore`].
///
/// Construct one explicitly and share it; there is no ambient singleton.
pub struct FileHistoryStore {
    path: PathBuf,
    // Serializes read-modify-write cycles across concurrent callers.
    lock: Mutex<()>,
}

impl FileHistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    async fn load_document(&self) -> HistoryDocument {
        if !self.path.exists() {
            return HistoryDocument::default();
        }

        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) => {
                log::error!("failed to read chat history: {err}");
                return HistoryDocument::default();
            }
        };

        match serde_json::from_str::<HistoryDocument>(&contents) {
            Ok(document) if document.version == STORAGE_VERSION => document,
            Ok(document) => {
                log::warn!(
                    "chat history version mismatch ({} != {STORAGE_VERSION}), resetting storage",
                    document.version
                );
                HistoryDocument::default()
            }
            Err(err) => {
                log::warn!("invalid chat history data, resetting storage: {err}");
                HistoryDocument::default()
            }
        }
    }

    async fn write_document(&self, document: &HistoryDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, contents).await?;
        Ok(())
    }

    /// Persist, evicting the oldest chats and retrying once when the first
    /// write fails (the file-storage analogue of a quota-exceeded recovery).
    async fn persist(&self, document: &mut HistoryDocument) -> Result<()> {
        match self.write_document(document).await {
            Ok(()) => Ok(()),
            Err(first_err) => {
                log::warn!(
                    "failed to persist chat history ({first_err}), evicting {EVICT_ON_WRITE_FAILURE} oldest and retrying"
                );
                document.chats.sort_by_key(|c| std::cmp::Reverse(c.updated_at));
                let keep = document.chats.len().saturating_sub(EVICT_ON_WRITE_FAILURE);
                document.chats.truncate(keep);

                self.write_document(document).await.map_err(|retry_err| {
                    log::error!("still failed to persist chat history after eviction: {retry_err}");
                    retry_err
                })
            }
        }
    }

    fn sorted_desc(mut chats: Vec<SavedChat>) -> Vec<SavedChat> {
        chats.sort_by_key(|c| std::cmp::Reverse(c.updated_at));
        chats
    }
}

#[async_trait]
impl ChatHistoryStore for FileHistoryStore {
    async fn list(&self) -> Result<Vec<SavedChat>> {
        let _guard = self.lock.lock().await;
        let document = self.load_document().await;
        Ok(Self::sorted_desc(document.chats))
    }

    async fn list_page(&self, page_size: usize, offset: usize) -> Result<Vec<SavedChat>> {
        let _guard = self.lock.lock().await;
        let document = self.load_document().await;
        Ok(Self::sorted_desc(document.chats)
            .into_iter()
            .skip(offset)
            .take(page_size)
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<SavedChat> {
        let _guard = self.lock.lock().await;
        let document = self.load_document().await;
        document
            .chats
            .into_iter()
            .find(|chat| chat.id == id)
            .ok_or(StoreError::NotFound)
    }

    async fn save(
        &self,
        messages: &[ConversationMessage],
        model: &str,
    ) -> Result<Option<SavedChat>> {
        if messages.is_empty() {
            return Ok(None);
        }

        let _guard = self.lock.lock().await;
        let mut document = self.load_document().await;

        let now = Utc::now();
        let chat = SavedChat {
            id: Uuid::new_v4().to_string(),
            messages: messages.to_vec(),
            model: model.to_string(),
            created_at: now,
            updated_at: now,
        };

        document.chats.insert(0, chat.clone());

        // Retention: keep only the most recently updated MAX_CHATS.
        document.chats.sort_by_key(|c| std::cmp::Reverse(c.updated_at));
        document.chats.truncate(MAX_CHATS);

        self.persist(&mut document).await?;
        Ok(Some(chat))
    }

    async fn update(
        &self,
        id: &str,
        messages: &[ConversationMessage],
        model: &str,
    ) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut document = self.load_document().await;

        let Some(chat) = document.chats.iter_mut().find(|chat| chat.id == id) else {
            return Ok(false);
        };

        chat.messages = messages.to_vec();
        chat.model = model.to_string();
        chat.updated_at = Utc::now();

        self.persist(&mut document).await?;
        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut document = self.load_document().await;

        let initial_len = document.chats.len();
        document.chats.retain(|chat| chat.id != id);
        if document.chats.len() == initial_len {
            return Ok(false);
        }

        self.persist(&mut document).await?;
        Ok(true)
    }

    async fn clear_all(&self) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut document = HistoryDocument::default();
        self.persist(&mut document).await?;
        Ok(true)
    }
}
