//! Session store - keyed per-user records with infallible upserting setters
//!
//! Unknown users read as a default idle session; setters create the record
//! on first touch. Field access takes the store lock briefly; callers that
//! need a whole read-act-write span to be atomic per user (the dispatcher
//! and the reaper) hold the user's dispatch lock from `user_lock` for the
//! duration.

use std::collections::HashMap;
use std::sync::Arc;

use bot_state::UserState;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::structs::Session;

/// Shared, process-lifetime store of every known user's session.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<i64, Session>>,
    /// One lock per user, held across a full dispatch or reaper reset.
    user_locks: RwLock<HashMap<i64, Arc<Mutex<()>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Eagerly create idle sessions for already-authorized users.
    pub async fn seed(&self, user_ids: &[i64]) {
        let mut sessions = self.sessions.write().await;
        for user_id in user_ids {
            sessions.entry(*user_id).or_default();
        }
    }

    /// Snapshot of the user's session; a default idle session if unknown.
    pub async fn get(&self, user_id: i64) -> Session {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// All user ids the store has seen (reaper sweep input).
    pub async fn known_users(&self) -> Vec<i64> {
        self.sessions.read().await.keys().copied().collect()
    }

    /// The per-user serialization lock. The dispatcher holds it for the
    /// full handler run; the reaper holds it for the full reset.
    pub async fn user_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
        {
            let locks = self.user_locks.read().await;
            if let Some(lock) = locks.get(&user_id) {
                return Arc::clone(lock);
            }
        }
        let mut locks = self.user_locks.write().await;
        Arc::clone(locks.entry(user_id).or_default())
    }

    async fn update<F: FnOnce(&mut Session)>(&self, user_id: i64, mutate: F) {
        let mut sessions = self.sessions.write().await;
        mutate(sessions.entry(user_id).or_default());
    }

    pub async fn set_state(&self, user_id: i64, state: UserState) {
        self.update(user_id, |session| session.state = state).await;
    }

    pub async fn set_active_conversation(&self, user_id: i64, conversation_id: Option<i64>) {
        self.update(user_id, |session| {
            session.active_conversation_id = conversation_id
        })
        .await;
    }

    pub async fn append_message_id(&self, user_id: i64, message_id: i64) {
        self.update(user_id, |session| session.sent_message_ids.push(message_id))
            .await;
    }

    pub async fn replace_message_ids(&self, user_id: i64, message_ids: Vec<i64>) {
        self.update(user_id, |session| session.sent_message_ids = message_ids)
            .await;
    }

    /// Drain the ledger, leaving it empty. The caller bulk-deletes the
    /// returned ids; the ledger stays cleared even if that delete fails.
    pub async fn take_message_ids(&self, user_id: i64) -> Vec<i64> {
        let mut sessions = self.sessions.write().await;
        std::mem::take(&mut sessions.entry(user_id).or_default().sent_message_ids)
    }

    /// Reset a session to idle: state, conversation, activity, and
    /// scratch all cleared. The ledger is untouched; flushing it needs
    /// the transport and stays with the caller.
    pub async fn reset_to_idle(&self, user_id: i64) {
        self.update(user_id, Session::reset_to_idle).await;
    }

    pub async fn set_last_activity(&self, user_id: i64, at: Option<DateTime<Utc>>) {
        self.update(user_id, |session| session.last_activity = at)
            .await;
    }

    pub async fn set_scratch(&self, user_id: i64, key: &str, value: serde_json::Value) {
        let key = key.to_string();
        self.update(user_id, |session| {
            session.scratch.insert(key, value);
        })
        .await;
    }

    /// Consume-once read of a scratch value.
    pub async fn take_scratch(&self, user_id: i64, key: &str) -> Option<serde_json::Value> {
        let mut sessions = self.sessions.write().await;
        sessions.entry(user_id).or_default().scratch.remove(key)
    }

    pub async fn clear_scratch(&self, user_id: i64) {
        self.update(user_id, |session| session.scratch.clear()).await;
    }

    /// Drop a session entirely. Only used when a user's authorization is
    /// revoked; timeouts and quits reset to idle instead.
    pub async fn remove(&self, user_id: i64) {
        self.sessions.write().await.remove(&user_id);
        self.user_locks.write().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_reads_as_idle_default() {
        let store = SessionStore::new();
        let session = store.get(404).await;
        assert_eq!(session.state, UserState::Idle);
        assert!(session.sent_message_ids.is_empty());
    }

    #[tokio::test]
    async fn test_state_read_after_write() {
        let store = SessionStore::new();
        for state in [
            UserState::MainMenu,
            UserState::InConversation,
            UserState::Idle,
        ] {
            store.set_state(7, state).await;
            assert_eq!(store.get(7).await.state, state);
        }
    }

    #[tokio::test]
    async fn test_ledger_preserves_insertion_order() {
        let store = SessionStore::new();
        for id in [5, 3, 9, 1] {
            store.append_message_id(7, id).await;
        }
        assert_eq!(store.get(7).await.sent_message_ids, vec![5, 3, 9, 1]);
    }

    #[tokio::test]
    async fn test_take_message_ids_drains_ledger() {
        let store = SessionStore::new();
        store.append_message_id(7, 1).await;
        store.append_message_id(7, 2).await;

        let taken = store.take_message_ids(7).await;
        assert_eq!(taken, vec![1, 2]);
        assert!(store.get(7).await.sent_message_ids.is_empty());

        // Draining an already-empty ledger is a no-op.
        assert!(store.take_message_ids(7).await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_to_idle_keeps_ledger() {
        let store = SessionStore::new();
        store.set_state(7, UserState::InConversation).await;
        store.set_active_conversation(7, Some(3)).await;
        store.set_last_activity(7, Some(Utc::now())).await;
        store.append_message_id(7, 11).await;

        store.reset_to_idle(7).await;

        let session = store.get(7).await;
        assert_eq!(session.state, UserState::Idle);
        assert!(session.active_conversation_id.is_none());
        assert!(session.last_activity.is_none());
        assert_eq!(session.sent_message_ids, vec![11]);
    }

    #[tokio::test]
    async fn test_scratch_is_consumed_once() {
        let store = SessionStore::new();
        store
            .set_scratch(7, "pending_removal", serde_json::json!(42))
            .await;
        assert_eq!(
            store.take_scratch(7, "pending_removal").await,
            Some(serde_json::json!(42))
        );
        assert_eq!(store.take_scratch(7, "pending_removal").await, None);
    }

    #[tokio::test]
    async fn test_seed_creates_idle_sessions() {
        let store = SessionStore::new();
        store.seed(&[1, 2, 3]).await;
        let mut users = store.known_users().await;
        users.sort_unstable();
        assert_eq!(users, vec![1, 2, 3]);
        assert_eq!(store.get(2).await.state, UserState::Idle);
    }

    #[tokio::test]
    async fn test_seed_does_not_clobber_existing_session() {
        let store = SessionStore::new();
        store.set_state(1, UserState::MainMenu).await;
        store.seed(&[1]).await;
        assert_eq!(store.get(1).await.state, UserState::MainMenu);
    }

    #[tokio::test]
    async fn test_remove_drops_session() {
        let store = SessionStore::new();
        store.set_state(1, UserState::MainMenu).await;
        store.remove(1).await;
        assert!(store.known_users().await.is_empty());
        assert_eq!(store.get(1).await.state, UserState::Idle);
    }

    #[tokio::test]
    async fn test_user_lock_is_stable_per_user() {
        let store = SessionStore::new();
        let a = store.user_lock(1).await;
        let b = store.user_lock(1).await;
        let c = store.user_lock(2).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
