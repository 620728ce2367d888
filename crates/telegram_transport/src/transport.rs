//! Transport trait - The seam between the bot core and the chat platform

use async_trait::async_trait;
use thiserror::Error;

use crate::markup::InlineKeyboard;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Outbound operations the bot core issues to the chat platform.
///
/// `delete_batch` is best-effort: failures are swallowed by the
/// implementation, since the caller clears its ledger either way.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a message and return its id.
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<InlineKeyboard>,
        silent: bool,
    ) -> Result<i64>;

    /// Edit a previously sent message in place.
    async fn edit(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<InlineKeyboard>,
    ) -> Result<()>;

    /// Delete a batch of messages, best-effort.
    async fn delete_batch(&self, chat_id: i64, message_ids: &[i64]);
}
