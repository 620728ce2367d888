//! Telegram Bot API client
//!
//! Messages are sent with Markdown formatting first and retried once as
//! plain text when Telegram rejects the formatting; a second failure
//! propagates for that message only.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::markup::InlineKeyboard;
use crate::transport::{ChatTransport, Result, TransportError};
use crate::wire::{ApiResponse, TgMessage, TgUpdate};

/// Telegram allows at most this many ids per deleteMessages call.
const DELETE_BATCH_LIMIT: usize = 100;

pub struct TelegramApi {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramApi {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: "https://api.telegram.org".to_string(),
            token: token.into(),
        }
    }

    /// Point the client at a different API host (used in tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let response = self.client.post(&url).json(&body).send().await?;
        let api_response: ApiResponse<T> = response.json().await?;

        if api_response.ok {
            api_response
                .result
                .ok_or_else(|| TransportError::Api(format!("{method}: empty result")))
        } else {
            Err(TransportError::Api(format!(
                "{method}: {}",
                api_response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string())
            )))
        }
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<TgUpdate>> {
        self.call(
            "getUpdates",
            json!({ "offset": offset, "timeout": timeout_secs }),
        )
        .await
    }

    /// Acknowledge a callback query so the client stops its spinner.
    pub async fn answer_callback(&self, callback_query_id: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }

    fn message_body(
        chat_id: i64,
        text: &str,
        markup: &Option<InlineKeyboard>,
        silent: bool,
        markdown: bool,
    ) -> serde_json::Value {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_notification": silent,
        });
        if markdown {
            body["parse_mode"] = json!("Markdown");
        }
        if let Some(markup) = markup {
            body["reply_markup"] = serde_json::to_value(markup).unwrap_or_default();
        }
        body
    }
}

#[async_trait]
impl ChatTransport for TelegramApi {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<InlineKeyboard>,
        silent: bool,
    ) -> Result<i64> {
        let body = Self::message_body(chat_id, text, &markup, silent, true);
        let sent: TgMessage = match self.call("sendMessage", body).await {
            Ok(message) => message,
            Err(TransportError::Api(error)) => {
                // Formatting fallback: retry once without parse_mode.
                log::warn!("sendMessage with markdown failed, retrying plain: {error}");
                let body = Self::message_body(chat_id, text, &markup, silent, false);
                self.call("sendMessage", body).await?
            }
            Err(other) => return Err(other),
        };
        Ok(sent.message_id)
    }

    async fn edit(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<InlineKeyboard>,
    ) -> Result<()> {
        let edit_body = |markdown: bool| {
            let mut body = Self::message_body(chat_id, text, &markup, false, markdown);
            body["message_id"] = json!(message_id);
            if let Some(object) = body.as_object_mut() {
                object.remove("disable_notification");
            }
            body
        };

        match self.call::<TgMessage>("editMessageText", edit_body(true)).await {
            Ok(_) => Ok(()),
            Err(TransportError::Api(error)) => {
                log::warn!("editMessageText with markdown failed, retrying plain: {error}");
                let _: TgMessage = self.call("editMessageText", edit_body(false)).await?;
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    async fn delete_batch(&self, chat_id: i64, message_ids: &[i64]) {
        for batch in message_ids.chunks(DELETE_BATCH_LIMIT) {
            let result: Result<bool> = self
                .call(
                    "deleteMessages",
                    json!({ "chat_id": chat_id, "message_ids": batch }),
                )
                .await;
            if let Err(error) = result {
                // Best-effort: messages may be older than the 48h delete
                // window or already gone.
                log::debug!("deleteMessages failed for chat {chat_id}: {error}");
            }
        }
    }
}
