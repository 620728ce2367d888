//! chat_storage - Durable conversation history and the user whitelist
//!
//! The bot core consumes two narrow traits: `ConversationStore` for
//! conversation/message CRUD and `Whitelist` for authorization. Both are
//! implemented by `SqliteChatStorage`.

pub mod sqlite;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use sqlite::SqliteChatStorage;
pub use types::{ConversationSummary, MessageRole, StoredMessage};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task join error: {0}")]
    Task(String),

    #[error("conversation {0} not found")]
    ConversationNotFound(i64),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Conversation and message persistence.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a conversation and return its id.
    async fn create_conversation(&self, user_id: i64, title: &str) -> Result<i64>;

    async fn rename_conversation(
        &self,
        user_id: i64,
        conversation_id: i64,
        title: &str,
    ) -> Result<()>;

    /// Delete a conversation and all its messages.
    async fn delete_conversation(&self, user_id: i64, conversation_id: i64) -> Result<()>;

    async fn list_conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>>;

    async fn get_title(&self, conversation_id: i64) -> Result<String>;

    async fn append_message(
        &self,
        user_id: i64,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> Result<()>;

    /// The most recent `limit` messages, returned oldest first.
    async fn recent_messages(
        &self,
        user_id: i64,
        conversation_id: i64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>>;

    /// The full transcript, oldest first.
    async fn all_messages(&self, user_id: i64, conversation_id: i64)
        -> Result<Vec<StoredMessage>>;
}

/// Authorization allow-list.
#[async_trait]
pub trait Whitelist: Send + Sync {
    async fn is_authorized(&self, user_id: i64) -> Result<bool>;

    async fn list_authorized(&self) -> Result<Vec<i64>>;

    async fn authorize(&self, user_id: i64) -> Result<()>;

    /// Remove a user from the whitelist, cascading their conversations
    /// and messages.
    async fn revoke(&self, user_id: i64) -> Result<()>;

    /// Record the user row on first `/start`; idempotent.
    async fn register_user(&self, user_id: i64, username: Option<&str>) -> Result<()>;
}
