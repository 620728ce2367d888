//! Navigation - /start, /quit, back, and the fallback notices

use bot_state::{EventKind, InboundEvent, UserState};

use super::{Handlers, Result};
use crate::{keyboards, strings};

impl Handlers {
    /// `/start`: wipe whatever screens are on display and land on a
    /// fresh main menu, from any state.
    pub(crate) async fn start(&self, event: &InboundEvent) -> Result<()> {
        self.flush_ledger(event.user_id, event.chat_id).await;
        self.send_ledgered(
            event,
            &strings::main_menu_message(),
            Some(keyboards::main_menu()),
            false,
        )
        .await?;

        self.store.set_active_conversation(event.user_id, None).await;
        self.store.clear_scratch(event.user_id).await;
        self.store.set_state(event.user_id, UserState::MainMenu).await;
        Ok(())
    }

    /// `/quit` and the quit button: notify, then wipe every ledgered
    /// message and return to idle. The notice goes out before the bulk
    /// delete so the user is not left staring at an empty chat.
    pub(crate) async fn quit(&self, event: &InboundEvent) -> Result<()> {
        let notice_id = self
            .transport
            .send(event.chat_id, &strings::idle_message(), None, false)
            .await?;

        self.flush_ledger(event.user_id, event.chat_id).await;
        self.store.append_message_id(event.user_id, notice_id).await;
        self.store.reset_to_idle(event.user_id).await;
        Ok(())
    }

    /// The back button: climb one level in the menu tree. Leaving a
    /// conversation wipes its ledgered messages and sends the parent menu
    /// fresh; everywhere else the origin message is edited in place.
    pub(crate) async fn back(&self, event: &InboundEvent) -> Result<()> {
        let session = self.store.get(event.user_id).await;
        let parent = session.state.parent();

        // Abandon any pending selection on the way out.
        self.store.set_active_conversation(event.user_id, None).await;
        self.store.clear_scratch(event.user_id).await;

        let (text, keyboard) = self.menu_screen(event.user_id, parent).await?;
        if session.state.flushes_ledger_on_exit() {
            self.flush_ledger(event.user_id, event.chat_id).await;
            self.send_ledgered(event, &text, Some(keyboard), false).await?;
        } else {
            self.edit_origin(event, &text, Some(keyboard)).await?;
        }

        self.store.set_state(event.user_id, parent).await;
        Ok(())
    }

    pub(crate) async fn idle_notice(&self, event: &InboundEvent) -> Result<()> {
        self.send_ledgered(event, &strings::idle_message(), None, false)
            .await?;
        Ok(())
    }

    pub(crate) async fn invalid_input(&self, event: &InboundEvent) -> Result<()> {
        // Ledger the stray message too so it is swept with everything
        // else. Callbacks carry no message of their own.
        if event.kind == EventKind::Text {
            self.store
                .append_message_id(event.user_id, event.origin_message_id)
                .await;
        }
        self.send_ledgered(event, &strings::invalid_input_error(), None, false)
            .await?;
        Ok(())
    }

    pub(crate) async fn unknown_command(&self, event: &InboundEvent) -> Result<()> {
        self.send_ledgered(event, &strings::invalid_command_error(), None, false)
            .await?;
        Ok(())
    }

    pub(crate) async fn help(&self, event: &InboundEvent) -> Result<()> {
        self.edit_origin(event, &strings::help_message(), Some(keyboards::back_quit()))
            .await
    }

    pub(crate) async fn show_id(&self, event: &InboundEvent) -> Result<()> {
        self.edit_origin(
            event,
            &strings::user_id_message(event.user_id),
            Some(keyboards::back_quit()),
        )
        .await
    }
}
