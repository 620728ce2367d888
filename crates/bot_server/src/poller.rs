//! Long-poll update loop
//!
//! Pulls updates from the platform, normalizes them into inbound events,
//! and hands each one to the dispatcher on its own task. Per-user ordering
//! is enforced downstream by the session store's user locks.

use std::sync::Arc;
use std::time::Duration;

use bot_state::InboundEvent;
use chat_storage::Whitelist;
use telegram_transport::wire::TgUpdate;
use telegram_transport::TelegramApi;
use tokio_util::sync::CancellationToken;

use crate::dispatch::Dispatcher;

const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct UpdatePoller {
    api: Arc<TelegramApi>,
    dispatcher: Arc<Dispatcher>,
    whitelist: Arc<dyn Whitelist>,
}

impl UpdatePoller {
    pub fn new(
        api: Arc<TelegramApi>,
        dispatcher: Arc<Dispatcher>,
        whitelist: Arc<dyn Whitelist>,
    ) -> Self {
        Self {
            api,
            dispatcher,
            whitelist,
        }
    }

    pub async fn run(self, cancel: CancellationToken) {
        let mut offset = 0i64;
        log::info!("update poller started");

        loop {
            let updates = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.api.get_updates(offset, POLL_TIMEOUT_SECS) => match result {
                    Ok(updates) => updates,
                    Err(error) => {
                        log::error!("polling for updates failed: {error}");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                },
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Some(event) = self.normalize(update).await {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    tokio::spawn(async move {
                        dispatcher.dispatch(event).await;
                    });
                }
            }
        }

        log::info!("update poller stopped");
    }

    /// Reduce a raw update to an inbound event. Updates without a sender,
    /// without text, or without callback data are dropped.
    async fn normalize(&self, update: TgUpdate) -> Option<InboundEvent> {
        if let Some(callback) = update.callback_query {
            // Acknowledge so the client stops its spinner, whatever
            // happens to the event afterwards.
            if let Err(error) = self.api.answer_callback(&callback.id).await {
                log::debug!("failed to answer callback {}: {error}", callback.id);
            }
            self.register(callback.from.id, callback.from.username.as_deref())
                .await;

            let message = callback.message?;
            let data = callback.data?;
            return Some(InboundEvent::callback(
                callback.from.id,
                message.chat.id,
                data,
                message.message_id,
            ));
        }

        let message = update.message?;
        let from = message.from?;
        let text = message.text?;
        self.register(from.id, from.username.as_deref()).await;

        if text.starts_with('/') {
            // "/start@SomeBot arg" counts as "/start".
            let command = text.split_whitespace().next().unwrap_or(&text);
            let command = command.split('@').next().unwrap_or(command);
            Some(InboundEvent::command(
                from.id,
                message.chat.id,
                command,
                message.message_id,
            ))
        } else {
            Some(InboundEvent::text(
                from.id,
                message.chat.id,
                text,
                message.message_id,
            ))
        }
    }

    /// Record the sender in the user table, best-effort.
    async fn register(&self, user_id: i64, username: Option<&str>) {
        if let Err(error) = self.whitelist.register_user(user_id, username).await {
            log::warn!("failed to record user {user_id}: {error}");
        }
    }
}
