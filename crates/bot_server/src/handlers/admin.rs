//! Admin flows - whitelist management behind /admin

use bot_state::{InboundEvent, UserState};
use serde_json::json;

use super::{Handlers, Result, REMOVE_TARGET_KEY};
use crate::{keyboards, strings};

impl Handlers {
    /// `/admin`: open the admin menu. Only the configured admin may enter,
    /// and only from the idle state so the menu never tramples an open
    /// conversation.
    pub(crate) async fn admin_command(&self, event: &InboundEvent) -> Result<()> {
        if event.user_id != self.admin_id {
            self.send_ledgered(event, &strings::not_admin_error(), None, false)
                .await?;
            return Ok(());
        }

        let session = self.store.get(event.user_id).await;
        if session.state != UserState::Idle {
            self.send_ledgered(event, &strings::admin_not_idle_error(), None, false)
                .await?;
            return Ok(());
        }

        self.send_ledgered(
            event,
            &strings::admin_menu_message(),
            Some(keyboards::admin_menu()),
            false,
        )
        .await?;
        self.store.set_state(event.user_id, UserState::AdminMenu).await;
        Ok(())
    }

    pub(crate) async fn admin_add_prompt(&self, event: &InboundEvent) -> Result<()> {
        self.edit_origin(
            event,
            &strings::add_user_prompt(),
            Some(keyboards::back_quit()),
        )
        .await?;
        self.store
            .set_state(event.user_id, UserState::AdminAddUser)
            .await;
        Ok(())
    }

    pub(crate) async fn admin_remove_menu(&self, event: &InboundEvent) -> Result<()> {
        let (text, keyboard) = self.remove_user_screen().await?;
        self.edit_origin(event, &text, Some(keyboard)).await?;
        self.store
            .set_state(event.user_id, UserState::AdminRemoveUserSelect)
            .await;
        Ok(())
    }

    pub(crate) async fn admin_show_users(&self, event: &InboundEvent) -> Result<()> {
        let user_ids = self.whitelist.list_authorized().await?;
        let text = if user_ids.is_empty() {
            strings::show_users_empty()
        } else {
            strings::show_users_message(&user_ids)
        };
        self.edit_origin(event, &text, Some(keyboards::back_quit()))
            .await?;
        self.store
            .set_state(event.user_id, UserState::AdminShowUsers)
            .await;
        Ok(())
    }

    /// Free text in the add-user state is the user id to whitelist.
    pub(crate) async fn add_whitelist_user(&self, event: &InboundEvent) -> Result<()> {
        let Ok(target) = event.payload.trim().parse::<i64>() else {
            self.send_ledgered(event, &strings::invalid_user_id_error(), None, false)
                .await?;
            return Ok(());
        };

        self.whitelist.authorize(target).await?;
        self.store.seed(&[target]).await;
        self.flush_ledger(event.user_id, event.chat_id).await;

        self.send_ledgered(
            event,
            &strings::add_user_success(target),
            Some(keyboards::admin_menu()),
            false,
        )
        .await?;
        self.store.set_state(event.user_id, UserState::AdminMenu).await;
        Ok(())
    }

    /// A user picked from the removal list: stash the target and ask for
    /// confirmation. The state does not change; yes/no consumes the stash.
    pub(crate) async fn select_user_for_removal(&self, event: &InboundEvent) -> Result<()> {
        let Some(target) = event.payload_as_id() else {
            return self.invalid_input(event).await;
        };

        self.store
            .set_scratch(event.user_id, REMOVE_TARGET_KEY, json!(target))
            .await;
        self.edit_origin(
            event,
            &strings::remove_user_confirm(target),
            Some(keyboards::confirmation()),
        )
        .await?;
        Ok(())
    }

    /// Yes/no on the removal confirmation. The stashed target is taken
    /// exactly once; a confirmation without one is stale.
    pub(crate) async fn confirm_remove_user(&self, event: &InboundEvent) -> Result<()> {
        let target = self
            .store
            .take_scratch(event.user_id, REMOVE_TARGET_KEY)
            .await
            .and_then(|value| value.as_i64());

        let outcome = match (target, event.payload.as_str()) {
            (Some(target), "yes") => {
                self.whitelist.revoke(target).await?;
                // Drop the revoked user's session and pending cleanup.
                self.store.remove(target).await;
                Some(strings::remove_user_success(target))
            }
            (Some(_), _) => None,
            (None, _) => {
                log::warn!(
                    "user {} confirmed a removal with no selected target",
                    event.user_id
                );
                Some(strings::please_retry_error())
            }
        };

        let (screen_text, keyboard) = self.remove_user_screen().await?;
        let text = outcome.unwrap_or(screen_text);
        self.edit_origin(event, &text, Some(keyboard)).await?;
        Ok(())
    }
}
