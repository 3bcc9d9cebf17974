//! Transition logic for the session state machine.

use super::events::SessionEvent;
use super::states::SessionState;

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: SessionState,
    /// The state after the transition.
    pub to: SessionState,
    /// The event that triggered the transition.
    pub event: SessionEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// State machine for the session controller.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current state.
    current_state: SessionState,
    /// Transition history (limited).
    history: Vec<StateTransition>,
    /// Max history entries to keep.
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new machine with no active conversation.
    pub fn new() -> Self {
        Self {
            current_state: SessionState::NoConversation,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Create a machine with a specific initial state.
    pub fn with_state(state: SessionState) -> Self {
        Self {
            current_state: state,
            history: Vec::new(),
            max_history: 50,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.current_state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Handle an event and transition to a new state.
    pub fn handle_event(&mut self, event: SessionEvent) -> StateTransition {
        let old_state = self.current_state.clone();
        let new_state = Self::compute_next_state(&old_state, &event);
        let changed = old_state != new_state;

        self.current_state = new_state.clone();

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    fn compute_next_state(state: &SessionState, event: &SessionEvent) -> SessionState {
        use SessionEvent::*;
        use SessionState::*;

        match (state, event) {
            // Editing an unsaved transcript keeps (or starts) the draft;
            // editing a saved one stays on the same record.
            (NoConversation | Drafting, MessagesChanged) => Drafting,
            (Active { chat_id }, MessagesChanged) => Active {
                chat_id: chat_id.clone(),
            },

            // An autosave pins the draft to its freshly assigned id. A save
            // of an already-active conversation keeps the id it reported.
            (_, AutosaveCompleted { chat_id }) => Active {
                chat_id: chat_id.clone(),
            },

            // New conversation and model switches restart as a draft; the
            // service layer saves the outgoing transcript first.
            (_, NewConversation) => Drafting,
            (_, ModelSwitched) => Drafting,

            (_, ConversationLoaded { chat_id }) => Active {
                chat_id: chat_id.clone(),
            },

            // Deleting the active conversation orphans the transcript back
            // into a draft. Deleting any other record changes nothing.
            (Active { chat_id }, ConversationDeleted { chat_id: deleted }) => {
                if chat_id == deleted {
                    Drafting
                } else {
                    Active {
                        chat_id: chat_id.clone(),
                    }
                }
            }
            (other, ConversationDeleted { .. }) => other.clone(),
        }
    }
}
