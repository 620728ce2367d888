//! Telegram wire types - the subset of the Bot API this bot consumes

use serde::Deserialize;

/// Envelope every Bot API method returns.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    pub message: Option<TgMessage>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_with_message_deserializes() {
        let json = r#"{
            "update_id": 7,
            "message": {
                "message_id": 101,
                "from": { "id": 42, "username": "alice" },
                "chat": { "id": 42 },
                "text": "/start"
            }
        }"#;
        let update: TgUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.update_id, 7);
        let message = update.message.unwrap();
        assert_eq!(message.message_id, 101);
        assert_eq!(message.from.unwrap().id, 42);
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn test_update_with_callback_deserializes() {
        let json = r#"{
            "update_id": 8,
            "callback_query": {
                "id": "abc",
                "from": { "id": 42 },
                "message": { "message_id": 5, "chat": { "id": 42 } },
                "data": "create"
            }
        }"#;
        let update: TgUpdate = serde_json::from_str(json).unwrap();
        let callback = update.callback_query.unwrap();
        assert_eq!(callback.data.as_deref(), Some("create"));
        assert_eq!(callback.message.unwrap().chat.id, 42);
    }

    #[test]
    fn test_error_envelope_deserializes() {
        let json = r#"{ "ok": false, "description": "Bad Request: can't parse entities" }"#;
        let response: ApiResponse<TgMessage> = serde_json::from_str(json).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert!(response.description.unwrap().contains("parse entities"));
    }
}
