//! Menu handlers
//!
//! One method per route. Handlers assume the dispatcher already holds the
//! per-user lock, so session reads and writes within a handler never race
//! with the reaper or another update for the same user.

mod admin;
mod conversation;
mod navigation;

use std::sync::Arc;

use bot_state::{InboundEvent, UserState};
use chat_storage::{ConversationStore, StorageError, Whitelist};
use llm_client::{ChatGenerator, LlmError};
use session_manager::SessionStore;
use telegram_transport::{ChatTransport, InlineKeyboard, TransportError};
use thiserror::Error;

use crate::{keyboards, strings};

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("generation error: {0}")]
    Llm(#[from] LlmError),
}

pub type Result<T> = std::result::Result<T, HandlerError>;

/// Scratch key for the pending whitelist-removal target.
pub(crate) const REMOVE_TARGET_KEY: &str = "remove_target";

/// The collaborators every handler works against.
pub struct Handlers {
    pub store: Arc<SessionStore>,
    pub transport: Arc<dyn ChatTransport>,
    pub conversations: Arc<dyn ConversationStore>,
    pub whitelist: Arc<dyn Whitelist>,
    pub generator: Arc<dyn ChatGenerator>,
    pub admin_id: i64,
}

impl Handlers {
    /// Send a message and record its id in the user's cleanup ledger.
    pub(crate) async fn send_ledgered(
        &self,
        event: &InboundEvent,
        text: &str,
        markup: Option<InlineKeyboard>,
        silent: bool,
    ) -> Result<i64> {
        let message_id = self
            .transport
            .send(event.chat_id, text, markup, silent)
            .await?;
        self.store.append_message_id(event.user_id, message_id).await;
        Ok(message_id)
    }

    /// Rewrite the keyboard-bearing message the event originated from.
    pub(crate) async fn edit_origin(
        &self,
        event: &InboundEvent,
        text: &str,
        markup: Option<InlineKeyboard>,
    ) -> Result<()> {
        self.transport
            .edit(event.chat_id, event.origin_message_id, text, markup)
            .await?;
        Ok(())
    }

    /// Take every ledgered message id and delete the messages, best-effort.
    /// The ledger is cleared even when deletion fails.
    pub(crate) async fn flush_ledger(&self, user_id: i64, chat_id: i64) {
        let message_ids = self.store.take_message_ids(user_id).await;
        if !message_ids.is_empty() {
            self.transport.delete_batch(chat_id, &message_ids).await;
        }
    }

    /// Text and keyboard for a menu state, re-querying listings so the
    /// screen reflects current storage contents.
    pub(crate) async fn menu_screen(
        &self,
        user_id: i64,
        state: UserState,
    ) -> Result<(String, InlineKeyboard)> {
        let screen = match state {
            UserState::LoadConversation => {
                self.listing_screen(
                    user_id,
                    strings::load_menu_message(),
                    strings::load_menu_empty(),
                )
                .await?
            }
            UserState::EditConversationSelect => {
                self.listing_screen(
                    user_id,
                    strings::edit_menu_message(),
                    strings::edit_menu_empty(),
                )
                .await?
            }
            UserState::DeleteConversationSelect => {
                self.listing_screen(
                    user_id,
                    strings::delete_menu_message(),
                    strings::delete_menu_empty(),
                )
                .await?
            }
            UserState::AdminMenu => (strings::admin_menu_message(), keyboards::admin_menu()),
            _ => (strings::main_menu_message(), keyboards::main_menu()),
        };
        Ok(screen)
    }

    async fn listing_screen(
        &self,
        user_id: i64,
        message: String,
        empty_message: String,
    ) -> Result<(String, InlineKeyboard)> {
        let items = self.conversations.list_conversations(user_id).await?;
        if items.is_empty() {
            Ok((empty_message, keyboards::back_quit()))
        } else {
            Ok((message, keyboards::conversations(&items)))
        }
    }

    /// Screen for the whitelist-removal picker.
    pub(crate) async fn remove_user_screen(&self) -> Result<(String, InlineKeyboard)> {
        let user_ids = self.whitelist.list_authorized().await?;
        if user_ids.is_empty() {
            Ok((strings::remove_user_menu_empty(), keyboards::back_quit()))
        } else {
            Ok((
                strings::remove_user_menu(),
                keyboards::whitelist_users(&user_ids),
            ))
        }
    }
}
