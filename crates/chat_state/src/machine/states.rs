//! Session states.

use serde::{Deserialize, Serialize};

/// Lifecycle of the "current conversation" pointer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No conversation has been started since the session began.
    NoConversation,

    /// A conversation is in progress but has never been persisted.
    Drafting,

    /// The current conversation is backed by a stored record.
    Active {
        /// Id of the persisted record.
        chat_id: String,
    },
}

impl SessionState {
    /// The persisted id, when there is one.
    pub fn chat_id(&self) -> Option<&str> {
        match self {
            SessionState::Active { chat_id } => Some(chat_id),
            _ => None,
        }
    }
}
