//! SQLite implementation of the conversation store and whitelist
//!
//! Connections are opened per operation on a blocking thread; SQLite's own
//! locking handles cross-task interleaving. The tables carry no foreign-key
//! constraints: rows reference each other by plain user/conversation ids and
//! every cascade is an explicit multi-statement delete, so a conversation
//! can exist before its owner is whitelisted or registered.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::types::{ConversationSummary, MessageRole, StoredMessage};
use crate::{ConversationStore, Result, StorageError, Whitelist};

#[derive(Debug, Clone)]
pub struct SqliteChatStorage {
    db_path: PathBuf,
}

impl SqliteChatStorage {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Create the schema if it does not exist yet.
    pub async fn init(&self) -> Result<()> {
        log::info!("opening database at {}", self.db_path.display());
        self.with_connection(|connection| {
            connection.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS whitelist (
                    user_id INTEGER PRIMARY KEY,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );

                CREATE TABLE IF NOT EXISTS users (
                    user_id INTEGER PRIMARY KEY,
                    username TEXT
                );

                CREATE TABLE IF NOT EXISTS conversations (
                    conversation_id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    title TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS messages (
                    message_id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    conversation_id INTEGER NOT NULL,
                    message_role TEXT NOT NULL,
                    message_content TEXT NOT NULL,
                    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );

                CREATE INDEX IF NOT EXISTS idx_conversations_user ON conversations(user_id);
                CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id);
                "#,
            )?;
            Ok(())
        })
        .await
    }

    async fn with_connection<T, F>(&self, func: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let connection = Connection::open(&db_path)?;
            func(&connection)
        })
        .await
        .map_err(|error| StorageError::Task(error.to_string()))?
    }
}

#[async_trait]
impl ConversationStore for SqliteChatStorage {
    async fn create_conversation(&self, user_id: i64, title: &str) -> Result<i64> {
        let title = title.to_string();
        self.with_connection(move |connection| {
            connection.execute(
                "INSERT INTO conversations (user_id, title) VALUES (?1, ?2)",
                params![user_id, title],
            )?;
            let conversation_id = connection.last_insert_rowid();
            log::debug!("created conversation {conversation_id} for user {user_id}");
            Ok(conversation_id)
        })
        .await
    }

    async fn rename_conversation(
        &self,
        user_id: i64,
        conversation_id: i64,
        title: &str,
    ) -> Result<()> {
        let title = title.to_string();
        self.with_connection(move |connection| {
            connection.execute(
                "UPDATE conversations SET title = ?1 WHERE user_id = ?2 AND conversation_id = ?3",
                params![title, user_id, conversation_id],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_conversation(&self, user_id: i64, conversation_id: i64) -> Result<()> {
        self.with_connection(move |connection| {
            // Explicit cascade: messages first, then the conversation row.
            let messages = connection.execute(
                "DELETE FROM messages WHERE user_id = ?1 AND conversation_id = ?2",
                params![user_id, conversation_id],
            )?;
            connection.execute(
                "DELETE FROM conversations WHERE user_id = ?1 AND conversation_id = ?2",
                params![user_id, conversation_id],
            )?;
            log::debug!(
                "deleted conversation {conversation_id} of user {user_id} ({messages} messages)"
            );
            Ok(())
        })
        .await
    }

    async fn list_conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>> {
        self.with_connection(move |connection| {
            let mut statement = connection.prepare(
                "SELECT conversation_id, title FROM conversations
                 WHERE user_id = ?1 ORDER BY conversation_id",
            )?;
            let rows = statement.query_map(params![user_id], |row| {
                Ok(ConversationSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?;
            rows.collect::<std::result::Result<Vec<_>, _>>()
                .map_err(StorageError::from)
        })
        .await
    }

    async fn get_title(&self, conversation_id: i64) -> Result<String> {
        self.with_connection(move |connection| {
            connection
                .query_row(
                    "SELECT title FROM conversations WHERE conversation_id = ?1",
                    params![conversation_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or(StorageError::ConversationNotFound(conversation_id))
        })
        .await
    }

    async fn append_message(
        &self,
        user_id: i64,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> Result<()> {
        let content = content.to_string();
        self.with_connection(move |connection| {
            connection.execute(
                "INSERT INTO messages (user_id, conversation_id, message_role, message_content)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, conversation_id, role.as_str(), content],
            )?;
            Ok(())
        })
        .await
    }

    async fn recent_messages(
        &self,
        user_id: i64,
        conversation_id: i64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        self.with_connection(move |connection| {
            // Newest first under the limit, then reversed to oldest-first.
            let mut statement = connection.prepare(
                "SELECT message_role, message_content FROM messages
                 WHERE user_id = ?1 AND conversation_id = ?2
                 ORDER BY timestamp DESC, message_id DESC LIMIT ?3",
            )?;
            let rows = statement.query_map(
                params![user_id, conversation_id, limit as i64],
                row_to_message,
            )?;
            let mut messages =
                rows.collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
            messages.reverse();
            Ok(messages)
        })
        .await
    }

    async fn all_messages(
        &self,
        user_id: i64,
        conversation_id: i64,
    ) -> Result<Vec<StoredMessage>> {
        self.with_connection(move |connection| {
            let mut statement = connection.prepare(
                "SELECT message_role, message_content FROM messages
                 WHERE user_id = ?1 AND conversation_id = ?2
                 ORDER BY timestamp, message_id",
            )?;
            let rows =
                statement.query_map(params![user_id, conversation_id], row_to_message)?;
            rows.collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
                .map_err(StorageError::from)
        })
        .await
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> std::result::Result<StoredMessage, rusqlite::Error> {
    let role: String = row.get(0)?;
    Ok(StoredMessage {
        role: MessageRole::parse(&role).unwrap_or(MessageRole::Assistant),
        content: row.get(1)?,
    })
}

#[async_trait]
impl Whitelist for SqliteChatStorage {
    async fn is_authorized(&self, user_id: i64) -> Result<bool> {
        self.with_connection(move |connection| {
            let found: Option<i64> = connection
                .query_row(
                    "SELECT 1 FROM whitelist WHERE user_id = ?1",
                    params![user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn list_authorized(&self) -> Result<Vec<i64>> {
        self.with_connection(|connection| {
            let mut statement =
                connection.prepare("SELECT user_id FROM whitelist ORDER BY user_id")?;
            let rows = statement.query_map([], |row| row.get(0))?;
            rows.collect::<std::result::Result<Vec<_>, _>>()
                .map_err(StorageError::from)
        })
        .await
    }

    async fn authorize(&self, user_id: i64) -> Result<()> {
        self.with_connection(move |connection| {
            connection.execute(
                "INSERT OR IGNORE INTO whitelist (user_id) VALUES (?1)",
                params![user_id],
            )?;
            log::info!("whitelisted user {user_id}");
            Ok(())
        })
        .await
    }

    async fn revoke(&self, user_id: i64) -> Result<()> {
        self.with_connection(move |connection| {
            // Explicit cascade: messages, conversations, user row,
            // whitelist entry.
            connection.execute("DELETE FROM messages WHERE user_id = ?1", params![user_id])?;
            connection.execute(
                "DELETE FROM conversations WHERE user_id = ?1",
                params![user_id],
            )?;
            connection.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
            connection.execute("DELETE FROM whitelist WHERE user_id = ?1", params![user_id])?;
            log::info!("revoked user {user_id} and removed their data");
            Ok(())
        })
        .await
    }

    async fn register_user(&self, user_id: i64, username: Option<&str>) -> Result<()> {
        let username = username.map(str::to_string);
        self.with_connection(move |connection| {
            connection.execute(
                "INSERT OR IGNORE INTO users (user_id, username) VALUES (?1, ?2)",
                params![user_id, username],
            )?;
            Ok(())
        })
        .await
    }
}
