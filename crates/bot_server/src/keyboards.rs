//! Inline keyboards for every menu screen

use chat_storage::ConversationSummary;
use telegram_transport::InlineKeyboard;

pub fn main_menu() -> InlineKeyboard {
    InlineKeyboard::new()
        .button("🆕 Create New Conversation", "create")
        .button("💬 Load Existing Conversation", "load")
        .button("✏️ Edit Existing Conversation", "edit")
        .button("🗑️ Delete Existing Conversation", "delete")
        .row(&[("❓ Help", "help"), ("🆔 Show User ID", "id"), ("👋 Quit", "quit")])
}

pub fn back_quit() -> InlineKeyboard {
    InlineKeyboard::new().row(&[("🔙 Back", "back"), ("👋 Quit", "quit")])
}

pub fn confirmation() -> InlineKeyboard {
    InlineKeyboard::new().row(&[("✔️ Yes", "yes"), ("❌ No", "no")])
}

/// One button per conversation; the callback data is the conversation id.
pub fn conversations(items: &[ConversationSummary]) -> InlineKeyboard {
    let mut keyboard = InlineKeyboard::new();
    for item in items {
        keyboard = keyboard.button(&format!("💬 {}", item.title), &item.id.to_string());
    }
    keyboard.row(&[("🔙 Back", "back"), ("👋 Quit", "quit")])
}

pub fn admin_menu() -> InlineKeyboard {
    InlineKeyboard::new()
        .button("➕ Add Whitelist User", "add")
        .button("➖ Remove Whitelist User", "remove")
        .button("📜 Show Whitelist Users", "show")
        .button("👋 Quit", "quit")
}

/// One button per whitelisted user; the callback data is the user id.
pub fn whitelist_users(user_ids: &[i64]) -> InlineKeyboard {
    let mut keyboard = InlineKeyboard::new();
    for user_id in user_ids {
        keyboard = keyboard.button(&format!("👤 {user_id}"), &user_id.to_string());
    }
    keyboard.row(&[("🔙 Back", "back"), ("👋 Quit", "quit")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_keyboard_uses_ids_as_callback_data() {
        let items = vec![
            ConversationSummary {
                id: 3,
                title: "Physics".to_string(),
            },
            ConversationSummary {
                id: 9,
                title: "History".to_string(),
            },
        ];
        let keyboard = conversations(&items);
        // One row per conversation plus the navigation row.
        assert_eq!(keyboard.inline_keyboard.len(), 3);
        assert_eq!(keyboard.inline_keyboard[0][0].callback_data, "3");
        assert_eq!(keyboard.inline_keyboard[1][0].callback_data, "9");
        assert_eq!(keyboard.inline_keyboard[2][0].callback_data, "back");
    }
}
