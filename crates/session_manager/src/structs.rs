//! Session data structures

use std::collections::HashMap;

use bot_state::UserState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user in-memory session record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Session {
    /// Current menu position.
    pub state: UserState,

    /// Conversation being viewed, renamed, or pending deletion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_conversation_id: Option<i64>,

    /// Ids of messages the bot sent since the last ledger flush,
    /// oldest first. Flushed (bulk-deleted) on state exit.
    pub sent_message_ids: Vec<i64>,

    /// Time of the last inbound event; None while idle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,

    /// Small values carried across exactly one extra round-trip of a
    /// confirmation flow, cleared once consumed.
    #[serde(default)]
    pub scratch: HashMap<String, serde_json::Value>,
}

impl Session {
    /// Reset to idle: state, conversation, activity, and scratch all
    /// cleared. The ledger is left alone; flushing it is the caller's
    /// responsibility since it requires a transport call.
    pub fn reset_to_idle(&mut self) {
        self.state = UserState::Idle;
        self.active_conversation_id = None;
        self.last_activity = None;
        self.scratch.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle_with_empty_ledger() {
        let session = Session::default();
        assert_eq!(session.state, UserState::Idle);
        assert!(session.active_conversation_id.is_none());
        assert!(session.sent_message_ids.is_empty());
        assert!(session.last_activity.is_none());
        assert!(session.scratch.is_empty());
    }

    #[test]
    fn test_reset_keeps_ledger() {
        let mut session = Session {
            state: UserState::InConversation,
            active_conversation_id: Some(3),
            sent_message_ids: vec![1, 2],
            last_activity: Some(Utc::now()),
            ..Session::default()
        };
        session.reset_to_idle();
        assert_eq!(session.state, UserState::Idle);
        assert!(session.active_conversation_id.is_none());
        assert!(session.last_activity.is_none());
        assert_eq!(session.sent_message_ids, vec![1, 2]);
    }
}
