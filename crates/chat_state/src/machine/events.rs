//! Events that drive session state transitions.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The in-memory transcript changed (new message, edit, stream finish).
    MessagesChanged,

    /// A debounced autosave persisted the conversation under `chat_id`.
    AutosaveCompleted { chat_id: String },

    /// The user started a fresh conversation.
    NewConversation,

    /// The user switched models; the transcript restarts under the new one.
    ModelSwitched,

    /// A stored conversation was loaded into the session.
    ConversationLoaded { chat_id: String },

    /// A stored conversation was deleted.
    ConversationDeleted { chat_id: String },
}

impl SessionEvent {
    /// Short name used in transition logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::MessagesChanged => "messages_changed",
            SessionEvent::AutosaveCompleted { .. } => "autosave_completed",
            SessionEvent::NewConversation => "new_conversation",
            SessionEvent::ModelSwitched => "model_switched",
            SessionEvent::ConversationLoaded { .. } => "conversation_loaded",
            SessionEvent::ConversationDeleted { .. } => "conversation_deleted",
        }
    }
}
