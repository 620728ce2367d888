//! Event dispatch
//!
//! One entry point per inbound event: gate on the whitelist, take the
//! per-user lock, stamp activity, route, and run the handler. A handler
//! failure is logged and answered with a generic notice; it never takes
//! the dispatch loop down.

use std::sync::Arc;

use bot_state::{route_event, InboundEvent, Route};
use chrono::Utc;

use crate::handlers::{Handlers, Result};
use crate::strings;

pub struct Dispatcher {
    handlers: Arc<Handlers>,
}

impl Dispatcher {
    pub fn new(handlers: Arc<Handlers>) -> Self {
        Self { handlers }
    }

    /// Process one inbound event to completion.
    pub async fn dispatch(&self, event: InboundEvent) {
        if let Err(error) = self.process(&event).await {
            log::error!("handler failed for user {}: {error}", event.user_id);
            let notice = self
                .handlers
                .send_ledgered(&event, &strings::please_retry_error(), None, false)
                .await;
            if let Err(notice_error) = notice {
                log::error!(
                    "failed to notify user {} of the failure: {notice_error}",
                    event.user_id
                );
            }
        }
    }

    async fn process(&self, event: &InboundEvent) -> Result<()> {
        let handlers = &self.handlers;

        // Whitelist gate. The admin bypasses it so /admin works before
        // the admin has whitelisted anyone, including themselves.
        if event.user_id != handlers.admin_id
            && !handlers.whitelist.is_authorized(event.user_id).await?
        {
            log::info!("rejected event from non-whitelisted user {}", event.user_id);
            handlers
                .transport
                .send(event.chat_id, &strings::not_whitelisted_error(), None, false)
                .await?;
            return Ok(());
        }

        // Serialize against the reaper and concurrent updates for this
        // user. Held across the whole read-route-act-write span.
        let lock = handlers.store.user_lock(event.user_id).await;
        let _guard = lock.lock().await;

        handlers
            .store
            .set_last_activity(event.user_id, Some(Utc::now()))
            .await;

        let session = handlers.store.get(event.user_id).await;
        let route = route_event(session.state, event);
        log::debug!(
            "user {} in {:?}: {:?} event routed to {:?}",
            event.user_id,
            session.state,
            event.kind,
            route
        );
        self.run(route, event).await
    }

    async fn run(&self, route: Route, event: &InboundEvent) -> Result<()> {
        let h = &self.handlers;
        match route {
            Route::StartCommand => h.start(event).await,
            Route::QuitCommand | Route::Quit => h.quit(event).await,
            Route::AdminCommand => h.admin_command(event).await,
            Route::UnknownCommand => h.unknown_command(event).await,
            Route::Back => h.back(event).await,
            Route::MenuCreate => h.menu_create(event).await,
            Route::MenuLoad => h.menu_load(event).await,
            Route::MenuEdit => h.menu_edit(event).await,
            Route::MenuDelete => h.menu_delete(event).await,
            Route::MenuHelp => h.help(event).await,
            Route::MenuShowId => h.show_id(event).await,
            Route::LoadConversationById => h.load_conversation_by_id(event).await,
            Route::SelectConversationForRename => h.select_for_rename(event).await,
            Route::RenameConversation => h.rename_conversation(event).await,
            Route::SelectConversationForDelete => h.select_for_delete(event).await,
            Route::ConfirmDelete => h.confirm_delete(event).await,
            Route::StartConversation => h.start_conversation(event).await,
            Route::ContinueConversation => h.continue_conversation(event).await,
            Route::AdminAddPrompt => h.admin_add_prompt(event).await,
            Route::AdminRemoveMenu => h.admin_remove_menu(event).await,
            Route::AdminShowUsers => h.admin_show_users(event).await,
            Route::AddWhitelistUser => h.add_whitelist_user(event).await,
            Route::SelectUserForRemoval => h.select_user_for_removal(event).await,
            Route::ConfirmRemoveUser => h.confirm_remove_user(event).await,
            Route::IdleNotice => h.idle_notice(event).await,
            Route::InvalidInput => h.invalid_input(event).await,
        }
    }
}
