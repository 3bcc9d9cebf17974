//! Session controller: owns the current conversation pointer and the
//! debounced autosave.

use std::sync::Arc;
use std::time::Duration;

use chat_core::ConversationMessage;
use chat_state::{SessionEvent, StateMachine};
use history_store::{ChatHistoryStore, Result as StoreResult, SavedChat};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::dto::SessionView;

const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(2);

struct SessionInner {
    transcript: Vec<ConversationMessage>,
    model: String,
    machine: StateMachine,
    /// Pending autosave task. A single slot: scheduling a new one cancels
    /// whatever was waiting.
    autosave: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct SessionService {
    inner: Arc<Mutex<SessionInner>>,
    store: Arc<dyn ChatHistoryStore>,
    debounce: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn ChatHistoryStore>, default_model: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                transcript: Vec::new(),
                model: default_model.into(),
                machine: StateMachine::new(),
                autosave: None,
            })),
            store,
            debounce: AUTOSAVE_DEBOUNCE,
        }
    }

    /// Shorten the debounce window (tests).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub async fn view(&self) -> SessionView {
        let inner = self.inner.lock().await;
        SessionView {
            state: inner.machine.state().clone(),
            model: inner.model.clone(),
            message_count: inner.transcript.len(),
            title: chat_core::conversation_title(&inner.transcript),
        }
    }

    /// Replace the in-memory transcript and schedule a debounced autosave.
    pub async fn replace_messages(&self, messages: Vec<ConversationMessage>) {
        let mut inner = self.inner.lock().await;
        inner.transcript = messages;
        inner.machine.handle_event(SessionEvent::MessagesChanged);
        self.schedule_autosave(&mut inner);
    }

    /// Persist the current conversation now: update when it already has a
    /// record, create one otherwise. Empty transcripts are not saved.
    pub async fn save_current(&self) -> StoreResult<Option<SavedChat>> {
        let (transcript, model, chat_id) = {
            let inner = self.inner.lock().await;
            (
                inner.transcript.clone(),
                inner.model.clone(),
                inner.machine.state().chat_id().map(str::to_string),
            )
        };

        if transcript.is_empty() {
            return Ok(None);
        }

        let saved = match chat_id {
            Some(id) => {
                if self.store.update(&id, &transcript, &model).await? {
                    Some(self.store.get_by_id(&id).await?)
                } else {
                    log::error!("active chat {id} disappeared from the store; save skipped");
                    None
                }
            }
            None => self.store.save(&transcript, &model).await?,
        };

        if let Some(chat) = &saved {
            let mut inner = self.inner.lock().await;
            inner.machine.handle_event(SessionEvent::AutosaveCompleted {
                chat_id: chat.id.clone(),
            });
        }

        Ok(saved)
    }

    /// Start a fresh conversation, saving the outgoing one first when it has
    /// messages.
    pub async fn new_conversation(&self) -> StoreResult<()> {
        self.save_current().await?;

        let mut inner = self.inner.lock().await;
        inner.transcript.clear();
        inner.machine.handle_event(SessionEvent::NewConversation);
        Self::cancel_autosave(&mut inner);
        Ok(())
    }

    /// Switch models. The transcript carries over as an unsaved draft under
    /// the new model; the outgoing conversation is saved first.
    pub async fn switch_model(&self, model: impl Into<String>) -> StoreResult<()> {
        self.save_current().await?;

        let mut inner = self.inner.lock().await;
        inner.model = model.into();
        inner.machine.handle_event(SessionEvent::ModelSwitched);
        Self::cancel_autosave(&mut inner);
        Ok(())
    }

    /// Load a stored conversation into the session, saving the outgoing one
    /// first.
    pub async fn load(&self, id: &str) -> StoreResult<SavedChat> {
        self.save_current().await?;

        let chat = self.store.get_by_id(id).await?;

        let mut inner = self.inner.lock().await;
        inner.transcript = chat.messages.clone();
        inner.model = chat.model.clone();
        inner.machine.handle_event(SessionEvent::ConversationLoaded {
            chat_id: chat.id.clone(),
        });
        Self::cancel_autosave(&mut inner);
        Ok(chat)
    }

    /// Delete a stored conversation. Deleting the active one turns the
    /// in-memory transcript back into an unsaved draft.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let deleted = self.store.delete(id).await?;

        if deleted {
            let mut inner = self.inner.lock().await;
            let was_active = inner.machine.state().chat_id() == Some(id);
            inner.machine.handle_event(SessionEvent::ConversationDeleted {
                chat_id: id.to_string(),
            });
            // A pending autosave would re-create the record we just deleted.
            if was_active {
                Self::cancel_autosave(&mut inner);
            }
        }
        Ok(deleted)
    }

    fn schedule_autosave(&self, inner: &mut SessionInner) {
        Self::cancel_autosave(inner);

        let service = self.clone();
        let debounce = self.debounce;
        inner.autosave = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Err(err) = service.save_current().await {
                log::error!("autosave failed: {err}");
            }
        }));
    }

    fn cancel_autosave(inner: &mut SessionInner) {
        if let Some(handle) = inner.autosave.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_state::SessionState;
    use history_store::FileHistoryStore;
    use tempfile::tempdir;

    fn service(dir: &tempfile::TempDir) -> SessionService {
        let store = Arc::new(FileHistoryStore::new(dir.path().join("history.json")));
        SessionService::new(store, "gemini-2.0-flash").with_debounce(Duration::from_millis(20))
    }

    fn messages(text: &str) -> Vec<ConversationMessage> {
        vec![ConversationMessage::user(text)]
    }

    #[tokio::test]
    async fn test_autosave_fires_after_quiescence() {
        let dir = tempdir().unwrap();
        let service = service(&dir);

        service.replace_messages(messages("hello")).await;
        assert_eq!(service.view().await.state, SessionState::Drafting);

        tokio::time::sleep(Duration::from_millis(100)).await;

        let view = service.view().await;
        assert!(matches!(view.state, SessionState::Active { .. }));

        let chats = service.store.list().await.unwrap();
        assert_eq!(chats.len(), 1);
    }

    #[tokio::test]
    async fn test_autosave_supersede_keeps_one_record() {
        let dir = tempdir().unwrap();
        let service = service(&dir);

        service.replace_messages(messages("one")).await;
        service.replace_messages(messages("one two")).await;
        service.replace_messages(messages("one two three")).await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        let chats = service.store.list().await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].messages, messages("one two three"));
    }

    #[tokio::test]
    async fn test_save_current_empty_is_noop() {
        let dir = tempdir().unwrap();
        let service = service(&dir);
        assert!(service.save_current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subsequent_saves_update_in_place() {
        let dir = tempdir().unwrap();
        let service = service(&dir);

        service.replace_messages(messages("draft")).await;
        let first = service.save_current().await.unwrap().unwrap();

        service.replace_messages(messages("draft expanded")).await;
        let second = service.save_current().await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(service.store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_new_conversation_saves_then_clears() {
        let dir = tempdir().unwrap();
        let service = service(&dir);

        service.replace_messages(messages("keep me")).await;
        service.new_conversation().await.unwrap();

        let view = service.view().await;
        assert_eq!(view.message_count, 0);
        assert_eq!(view.state, SessionState::Drafting);

        let chats = service.store.list().await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].messages, messages("keep me"));
    }

    #[tokio::test]
    async fn test_model_switch_keeps_transcript_as_draft() {
        let dir = tempdir().unwrap();
        let service = service(&dir);

        service.replace_messages(messages("story so far")).await;
        service.save_current().await.unwrap();
        service.switch_model("llama-3.3-70b-versatile").await.unwrap();

        let view = service.view().await;
        assert_eq!(view.model, "llama-3.3-70b-versatile");
        assert_eq!(view.message_count, 1);
        assert_eq!(view.state, SessionState::Drafting);
    }

    #[tokio::test]
    async fn test_load_replaces_transcript_and_model() {
        let dir = tempdir().unwrap();
        let service = service(&dir);

        let stored = service
            .store
            .save(&messages("older chat"), "gemini-pro")
            .await
            .unwrap()
            .unwrap();

        let loaded = service.load(&stored.id).await.unwrap();
        assert_eq!(loaded.id, stored.id);

        let view = service.view().await;
        assert_eq!(view.model, "gemini-pro");
        assert_eq!(view.message_count, 1);
        assert_eq!(
            view.state,
            SessionState::Active {
                chat_id: stored.id.clone()
            }
        );
    }

    #[tokio::test]
    async fn test_delete_active_resets_to_draft() {
        let dir = tempdir().unwrap();
        let service = service(&dir);

        service.replace_messages(messages("doomed")).await;
        let saved = service.save_current().await.unwrap().unwrap();

        assert!(service.delete(&saved.id).await.unwrap());

        let view = service.view().await;
        assert_eq!(view.state, SessionState::Drafting);
        // The transcript itself survives as a draft.
        assert_eq!(view.message_count, 1);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let dir = tempdir().unwrap();
        let service = service(&dir);
        assert!(!service.delete("nope").await.unwrap());
    }
}
