//! Inactivity reaper - background sweep resetting timed-out sessions
//!
//! Runs on its own timer, independent of the dispatcher. Each cycle
//! computes `now` once, then resets every non-idle user whose last
//! activity is strictly older than the timeout: timeout notice, ledger
//! flush, back to idle. Sessions are never removed, only reset.

use std::sync::Arc;
use std::time::Duration;

use bot_state::UserState;
use chrono::{DateTime, Utc};
use telegram_transport::ChatTransport;
use tokio_util::sync::CancellationToken;

use crate::store::SessionStore;

#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// How often the sweep runs.
    pub poll_interval: Duration,
    /// Inactivity span after which a session is reset.
    pub idle_timeout: Duration,
    /// Notice sent to the user before their messages are cleared.
    pub timeout_notice: String,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(1800),
            timeout_notice: "You have been inactive for too long.".to_string(),
        }
    }
}

pub struct InactivityReaper {
    store: Arc<SessionStore>,
    transport: Arc<dyn ChatTransport>,
    config: ReaperConfig,
}

impl InactivityReaper {
    pub fn new(
        store: Arc<SessionStore>,
        transport: Arc<dyn ChatTransport>,
        config: ReaperConfig,
    ) -> Self {
        Self {
            store,
            transport,
            config,
        }
    }

    /// Run until `cancel` fires. Cancellation is checked between sweeps;
    /// a sweep in progress completes.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        // The first tick fires immediately; skip it so a fresh start does
        // not sweep sessions restored moments ago.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("inactivity reaper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep(Utc::now()).await;
                }
            }
        }
    }

    /// One sweep over every known user, with `now` fixed for the cycle.
    /// Returns the ids of the users that were reset.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Vec<i64> {
        let mut reset_users = Vec::new();

        for user_id in self.store.known_users().await {
            let lock = self.store.user_lock(user_id).await;
            let _guard = lock.lock().await;

            let session = self.store.get(user_id).await;
            let Some(last_activity) = session.last_activity else {
                continue;
            };
            if session.state == UserState::Idle {
                continue;
            }
            let elapsed = now.signed_duration_since(last_activity);
            // Strictly greater: exactly at the timeout does not reset yet.
            if elapsed.num_seconds() <= self.config.idle_timeout.as_secs() as i64 {
                continue;
            }

            // Private chats: the chat id is the user id.
            let notice_id = self
                .transport
                .send(user_id, &self.config.timeout_notice, None, true)
                .await;

            let stale_ids = self.store.take_message_ids(user_id).await;
            if !stale_ids.is_empty() {
                self.transport.delete_batch(user_id, &stale_ids).await;
            }

            self.store.reset_to_idle(user_id).await;

            match notice_id {
                Ok(message_id) => self.store.append_message_id(user_id, message_id).await,
                Err(error) => log::warn!("timeout notice for user {user_id} failed: {error}"),
            }

            log::info!("user {user_id} reset to idle after inactivity");
            reset_users.push(user_id);
        }

        reset_users
    }
}
