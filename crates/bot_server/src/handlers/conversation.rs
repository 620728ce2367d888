//! Conversation flows - create, load, chat, rename, delete

use bot_state::{InboundEvent, UserState};
use chat_storage::{MessageRole, StoredMessage};
use llm_client::ChatTurn;
use telegram_transport::text::MESSAGE_LIMIT;
use telegram_transport::split_message;

use super::{Handlers, Result};
use crate::{keyboards, strings};

/// How many stored messages are replayed to the generator as context.
const HISTORY_LIMIT: usize = 20;

fn to_turn(message: &StoredMessage) -> ChatTurn {
    ChatTurn {
        role: message.role.as_str().to_string(),
        content: message.content.clone(),
    }
}

fn transcript_entry(message: &StoredMessage) -> String {
    let header = match message.role {
        MessageRole::User => strings::USER_MESSAGE_HEADER,
        MessageRole::Assistant => strings::BOT_MESSAGE_HEADER,
    };
    format!("{header}{}", message.content)
}

impl Handlers {
    pub(crate) async fn menu_create(&self, event: &InboundEvent) -> Result<()> {
        self.edit_origin(
            event,
            &strings::new_conversation_prompt(),
            Some(keyboards::back_quit()),
        )
        .await?;
        self.store
            .set_state(event.user_id, UserState::NewConversation)
            .await;
        Ok(())
    }

    pub(crate) async fn menu_load(&self, event: &InboundEvent) -> Result<()> {
        self.enter_listing(event, UserState::LoadConversation).await
    }

    pub(crate) async fn menu_edit(&self, event: &InboundEvent) -> Result<()> {
        self.enter_listing(event, UserState::EditConversationSelect)
            .await
    }

    pub(crate) async fn menu_delete(&self, event: &InboundEvent) -> Result<()> {
        self.enter_listing(event, UserState::DeleteConversationSelect)
            .await
    }

    /// Enter a conversation-picker state. The state is entered even when
    /// the listing is empty, so the back button still works.
    async fn enter_listing(&self, event: &InboundEvent, state: UserState) -> Result<()> {
        let (text, keyboard) = self.menu_screen(event.user_id, state).await?;
        self.edit_origin(event, &text, Some(keyboard)).await?;
        self.store.set_state(event.user_id, state).await;
        Ok(())
    }

    /// First prompt of a fresh conversation: derive a title, create the
    /// conversation, then answer the prompt in it.
    pub(crate) async fn start_conversation(&self, event: &InboundEvent) -> Result<()> {
        let loading_id = self
            .send_ledgered(event, strings::LOADING_INDICATOR, None, true)
            .await?;

        let title = self.generator.generate_title(&event.payload).await?;
        let conversation_id = self
            .conversations
            .create_conversation(event.user_id, &title)
            .await?;

        self.transport
            .edit(
                event.chat_id,
                loading_id,
                &strings::new_conversation_started(&title),
                None,
            )
            .await?;

        self.store
            .set_active_conversation(event.user_id, Some(conversation_id))
            .await;
        self.answer_prompt(event, conversation_id).await?;
        self.store
            .set_state(event.user_id, UserState::InConversation)
            .await;
        Ok(())
    }

    pub(crate) async fn continue_conversation(&self, event: &InboundEvent) -> Result<()> {
        let session = self.store.get(event.user_id).await;
        let Some(conversation_id) = session.active_conversation_id else {
            log::warn!(
                "user {} is in a conversation with no active id",
                event.user_id
            );
            self.send_ledgered(event, &strings::please_retry_error(), None, false)
                .await?;
            return Ok(());
        };
        self.answer_prompt(event, conversation_id).await
    }

    /// Generate a reply to the prompt within a conversation and send it,
    /// chunked to the transport's message limit. The prompt is persisted
    /// only after generation succeeds, so the history handed to the
    /// generator never contains the prompt itself.
    async fn answer_prompt(&self, event: &InboundEvent, conversation_id: i64) -> Result<()> {
        let thinking_id = self
            .send_ledgered(event, strings::THINKING_INDICATOR, None, true)
            .await?;

        let history = self
            .conversations
            .recent_messages(event.user_id, conversation_id, HISTORY_LIMIT)
            .await?;
        let turns: Vec<ChatTurn> = history.iter().map(to_turn).collect();
        let reply = self.generator.generate_reply(&event.payload, &turns).await?;

        self.conversations
            .append_message(
                event.user_id,
                conversation_id,
                MessageRole::User,
                &event.payload,
            )
            .await?;
        self.conversations
            .append_message(
                event.user_id,
                conversation_id,
                MessageRole::Assistant,
                &reply,
            )
            .await?;

        self.transport
            .delete_batch(event.chat_id, &[thinking_id])
            .await;

        let text = format!(
            "{}{}\n\n{}{}{}",
            strings::USER_MESSAGE_HEADER,
            event.payload,
            strings::BOT_MESSAGE_HEADER,
            reply,
            strings::reply_footer()
        );
        self.send_chunked(event, &text, false).await
    }

    /// Load a stored conversation: replay its transcript and resume it.
    pub(crate) async fn load_conversation_by_id(&self, event: &InboundEvent) -> Result<()> {
        let Some(conversation_id) = event.payload_as_id() else {
            return self.invalid_input(event).await;
        };
        let title = self.conversations.get_title(conversation_id).await?;

        self.edit_origin(event, &strings::conversation_loaded_title(&title), None)
            .await?;

        let transcript = self
            .conversations
            .all_messages(event.user_id, conversation_id)
            .await?;
        for message in &transcript {
            self.send_chunked(event, &transcript_entry(message), true)
                .await?;
        }

        self.send_ledgered(
            event,
            &strings::continue_conversation_prompt(),
            Some(keyboards::back_quit()),
            false,
        )
        .await?;

        self.store
            .set_active_conversation(event.user_id, Some(conversation_id))
            .await;
        self.store
            .set_state(event.user_id, UserState::InConversation)
            .await;
        Ok(())
    }

    pub(crate) async fn select_for_rename(&self, event: &InboundEvent) -> Result<()> {
        let Some(conversation_id) = event.payload_as_id() else {
            return self.invalid_input(event).await;
        };
        let title = self.conversations.get_title(conversation_id).await?;

        self.store
            .set_active_conversation(event.user_id, Some(conversation_id))
            .await;
        self.edit_origin(
            event,
            &strings::rename_prompt(&title),
            Some(keyboards::back_quit()),
        )
        .await?;
        self.store
            .set_state(event.user_id, UserState::EditConversationRename)
            .await;
        Ok(())
    }

    /// Free text in the rename state is the new title.
    pub(crate) async fn rename_conversation(&self, event: &InboundEvent) -> Result<()> {
        let session = self.store.get(event.user_id).await;
        let Some(conversation_id) = session.active_conversation_id else {
            log::warn!("user {} renaming with no selected conversation", event.user_id);
            return self.invalid_input(event).await;
        };

        let title = event.payload.trim();
        self.conversations
            .rename_conversation(event.user_id, conversation_id, title)
            .await?;
        self.store.set_active_conversation(event.user_id, None).await;
        self.flush_ledger(event.user_id, event.chat_id).await;

        // Back to the picker, refreshed with the new title.
        let (_, keyboard) = self
            .menu_screen(event.user_id, UserState::EditConversationSelect)
            .await?;
        self.send_ledgered(event, &strings::rename_success(title), Some(keyboard), false)
            .await?;
        self.store
            .set_state(event.user_id, UserState::EditConversationSelect)
            .await;
        Ok(())
    }

    pub(crate) async fn select_for_delete(&self, event: &InboundEvent) -> Result<()> {
        let Some(conversation_id) = event.payload_as_id() else {
            return self.invalid_input(event).await;
        };
        let title = self.conversations.get_title(conversation_id).await?;

        self.store
            .set_active_conversation(event.user_id, Some(conversation_id))
            .await;
        self.edit_origin(
            event,
            &strings::delete_confirm(&title),
            Some(keyboards::confirmation()),
        )
        .await?;
        self.store
            .set_state(event.user_id, UserState::DeleteConversationConfirm)
            .await;
        Ok(())
    }

    /// Yes/no on the delete confirmation. Either way the selection is
    /// consumed and the user lands back on the refreshed picker.
    pub(crate) async fn confirm_delete(&self, event: &InboundEvent) -> Result<()> {
        let session = self.store.get(event.user_id).await;
        let selected = session.active_conversation_id;
        self.store.set_active_conversation(event.user_id, None).await;

        let (text, keyboard) = match (selected, event.payload.as_str()) {
            (Some(conversation_id), "yes") => {
                self.conversations
                    .delete_conversation(event.user_id, conversation_id)
                    .await?;
                (strings::delete_success(), keyboards::back_quit())
            }
            (Some(_), _) => {
                self.menu_screen(event.user_id, UserState::DeleteConversationSelect)
                    .await?
            }
            (None, _) => {
                log::warn!(
                    "user {} confirmed a delete with no selected conversation",
                    event.user_id
                );
                (strings::please_retry_error(), keyboards::back_quit())
            }
        };
        self.edit_origin(event, &text, Some(keyboard)).await?;
        self.store
            .set_state(event.user_id, UserState::DeleteConversationSelect)
            .await;
        Ok(())
    }

    /// Send `text` as one or more messages under the platform size limit,
    /// attaching the navigation keyboard to the final chunk.
    async fn send_chunked(&self, event: &InboundEvent, text: &str, silent: bool) -> Result<()> {
        let chunks = split_message(text, MESSAGE_LIMIT);
        let last = chunks.len().saturating_sub(1);
        for (index, chunk) in chunks.iter().enumerate() {
            let markup = if index == last && !silent {
                Some(keyboards::back_quit())
            } else {
                None
            };
            self.send_ledgered(event, chunk, markup, silent).await?;
        }
        Ok(())
    }
}
