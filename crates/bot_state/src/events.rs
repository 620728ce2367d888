//! Inbound events - The normalized shape every transport update reduces to

use serde::{Deserialize, Serialize};

/// How the event arrived at the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A slash command (`/start`, `/quit`, `/admin`, ...).
    Command,
    /// An inline-keyboard button press; payload is the callback data.
    Callback,
    /// Free text.
    Text,
}

/// A normalized inbound event from the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    pub user_id: i64,
    pub chat_id: i64,
    pub kind: EventKind,
    /// Command string, callback data, or message text.
    pub payload: String,
    /// Id of the inbound message, or of the keyboard-bearing message for
    /// callbacks (the one to edit in place).
    pub origin_message_id: i64,
}

impl InboundEvent {
    pub fn command(user_id: i64, chat_id: i64, payload: impl Into<String>, message_id: i64) -> Self {
        Self {
            user_id,
            chat_id,
            kind: EventKind::Command,
            payload: payload.into(),
            origin_message_id: message_id,
        }
    }

    pub fn callback(user_id: i64, chat_id: i64, payload: impl Into<String>, message_id: i64) -> Self {
        Self {
            user_id,
            chat_id,
            kind: EventKind::Callback,
            payload: payload.into(),
            origin_message_id: message_id,
        }
    }

    pub fn text(user_id: i64, chat_id: i64, payload: impl Into<String>, message_id: i64) -> Self {
        Self {
            user_id,
            chat_id,
            kind: EventKind::Text,
            payload: payload.into(),
            origin_message_id: message_id,
        }
    }

    /// Whether the payload is a decimal integer. Disambiguates item-picker
    /// callbacks (conversation ids, user ids) from fixed action callbacks.
    pub fn payload_is_digits(&self) -> bool {
        !self.payload.is_empty() && self.payload.bytes().all(|b| b.is_ascii_digit())
    }

    /// Payload parsed as a decimal id, when `payload_is_digits` holds.
    pub fn payload_as_id(&self) -> Option<i64> {
        if self.payload_is_digits() {
            self.payload.parse().ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_payload_detection() {
        let ev = InboundEvent::callback(1, 1, "42", 10);
        assert!(ev.payload_is_digits());
        assert_eq!(ev.payload_as_id(), Some(42));

        let ev = InboundEvent::callback(1, 1, "back", 10);
        assert!(!ev.payload_is_digits());
        assert_eq!(ev.payload_as_id(), None);

        let ev = InboundEvent::callback(1, 1, "", 10);
        assert!(!ev.payload_is_digits());

        let ev = InboundEvent::callback(1, 1, "4a2", 10);
        assert!(!ev.payload_is_digits());
    }
}
