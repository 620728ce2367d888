//! User states - Defines all menu positions of a user session
//!
//! The menu hierarchy is a tree, not a path history: every state knows its
//! parent, so back-navigation is a table lookup rather than a stack pop.

use serde::{Deserialize, Serialize};

/// Defines the possible menu positions of a user session.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserState {
    /// Not interacting with the bot; entered via `/quit` or timeout.
    Idle,

    /// Top-level menu with the create/load/edit/delete/help/id buttons.
    MainMenu,

    /// Waiting for the first prompt of a brand-new conversation.
    NewConversation,

    /// Picking a conversation to resume from the list keyboard.
    LoadConversation,

    /// Picking a conversation to rename.
    EditConversationSelect,

    /// Waiting for the new title of the selected conversation.
    EditConversationRename,

    /// Picking a conversation to delete.
    DeleteConversationSelect,

    /// Yes/no confirmation before the delete is performed.
    DeleteConversationConfirm,

    /// Exchanging prompts and replies inside an active conversation.
    InConversation,

    /// Admin menu with the add/remove/show whitelist buttons.
    AdminMenu,

    /// Waiting for the user id to whitelist.
    AdminAddUser,

    /// Picking a whitelisted user to remove (and confirming it).
    AdminRemoveUserSelect,

    /// Viewing the whitelist.
    AdminShowUsers,
}

impl Default for UserState {
    fn default() -> Self {
        UserState::Idle
    }
}

impl UserState {
    /// Parent state the `back` button returns to.
    pub fn parent(&self) -> UserState {
        use UserState::*;

        match self {
            EditConversationRename => EditConversationSelect,
            DeleteConversationConfirm => DeleteConversationSelect,
            AdminAddUser | AdminRemoveUserSelect | AdminShowUsers => AdminMenu,
            _ => MainMenu,
        }
    }

    /// Whether leaving this state must bulk-delete the ledgered messages.
    ///
    /// Only the in-conversation transcript is worth clearing on exit; menu
    /// screens are edited in place.
    pub fn flushes_ledger_on_exit(&self) -> bool {
        matches!(self, UserState::InConversation)
    }

    /// Whether this state renders an inline keyboard and therefore expects
    /// a callback rather than free text.
    pub fn expects_callback(&self) -> bool {
        use UserState::*;

        matches!(
            self,
            MainMenu
                | LoadConversation
                | EditConversationSelect
                | DeleteConversationSelect
                | DeleteConversationConfirm
                | AdminMenu
                | AdminRemoveUserSelect
                | AdminShowUsers
        )
    }

    /// Whether an `active_conversation_id` may be set in this state.
    pub fn carries_conversation(&self) -> bool {
        matches!(
            self,
            UserState::InConversation
                | UserState::EditConversationRename
                | UserState::DeleteConversationConfirm
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(UserState::default(), UserState::Idle);
    }

    #[test]
    fn test_back_tree() {
        assert_eq!(
            UserState::EditConversationRename.parent(),
            UserState::EditConversationSelect
        );
        assert_eq!(
            UserState::DeleteConversationConfirm.parent(),
            UserState::DeleteConversationSelect
        );
        assert_eq!(UserState::AdminAddUser.parent(), UserState::AdminMenu);
        assert_eq!(UserState::AdminShowUsers.parent(), UserState::AdminMenu);
        assert_eq!(UserState::InConversation.parent(), UserState::MainMenu);
        assert_eq!(UserState::LoadConversation.parent(), UserState::MainMenu);
    }

    #[test]
    fn test_only_conversation_exit_flushes() {
        assert!(UserState::InConversation.flushes_ledger_on_exit());
        assert!(!UserState::MainMenu.flushes_ledger_on_exit());
        assert!(!UserState::EditConversationRename.flushes_ledger_on_exit());
    }

    #[test]
    fn test_conversation_bearing_states() {
        assert!(UserState::InConversation.carries_conversation());
        assert!(UserState::EditConversationRename.carries_conversation());
        assert!(UserState::DeleteConversationConfirm.carries_conversation());
        assert!(!UserState::LoadConversation.carries_conversation());
    }
}
