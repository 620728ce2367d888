//! User-visible copy
//!
//! Messages use Telegram Markdown (v1); the transport retries without
//! formatting if Telegram rejects a message, so dynamic content only needs
//! `escape_markdown` when it lands inside emphasis markers (conversation
//! titles rendered as `_title_`).

use telegram_transport::escape_markdown;

const DIVIDER: &str = "--------------------";

fn header(section: &str) -> String {
    format!("🤖 *StudyBot* | {section}\n{DIVIDER}\n")
}

pub const NAVIGATION_FOOTER: &str = "\n\nUse the buttons below to go back or quit.";

// Stable notices.

pub fn idle_message() -> String {
    format!(
        "{}You are currently idle. Use /start to begin.",
        header("Idle")
    )
}

pub fn timeout_message() -> String {
    format!(
        "{}You have been inactive for too long. Use /start to begin.",
        header("Timeout")
    )
}

pub fn main_menu_message() -> String {
    format!(
        "{}Welcome to StudyBot! I am here to help you with your studies.\n\n\
         Select any of the following options to get started.",
        header("Main Menu")
    )
}

pub fn help_message() -> String {
    format!(
        "{}/start - Start the bot.\n\
         /quit - Quit the bot. Same as the 👋 Quit button.{NAVIGATION_FOOTER}",
        header("Help")
    )
}

pub fn user_id_message(user_id: i64) -> String {
    format!(
        "{}Your user ID is *{user_id}*.{NAVIGATION_FOOTER}",
        header("User ID")
    )
}

// Conversation flows.

pub fn new_conversation_prompt() -> String {
    format!(
        "{}Send a prompt to start the conversation.{NAVIGATION_FOOTER}",
        header("New Conversation")
    )
}

pub fn new_conversation_started(title: &str) -> String {
    let title = escape_markdown(title);
    format!("{}Now conversing in _{title}_.", header("New Conversation"))
}

pub fn load_menu_message() -> String {
    format!(
        "{}Select a conversation to load from the list below.{NAVIGATION_FOOTER}",
        header("Load Conversation")
    )
}

pub fn load_menu_empty() -> String {
    format!(
        "{}No conversations to load.{NAVIGATION_FOOTER}",
        header("Load Conversation")
    )
}

pub fn conversation_loaded_title(title: &str) -> String {
    let title = escape_markdown(title);
    format!("{}_{title}_", header("Existing Conversation"))
}

pub fn continue_conversation_prompt() -> String {
    format!(
        "{}Send a prompt to continue the conversation.{NAVIGATION_FOOTER}",
        header("Existing Conversation")
    )
}

pub fn edit_menu_message() -> String {
    format!(
        "{}Select a conversation to edit from the list below.{NAVIGATION_FOOTER}",
        header("Edit Conversation")
    )
}

pub fn edit_menu_empty() -> String {
    format!(
        "{}No conversations to edit.{NAVIGATION_FOOTER}",
        header("Edit Conversation")
    )
}

pub fn rename_prompt(title: &str) -> String {
    let title = escape_markdown(title);
    format!(
        "{}Enter a new name for _{title}_.{NAVIGATION_FOOTER}",
        header("Edit Conversation")
    )
}

pub fn rename_success(title: &str) -> String {
    let title = escape_markdown(title);
    format!(
        "{}Conversation has been renamed to _{title}_.{NAVIGATION_FOOTER}",
        header("Edit Conversation")
    )
}

pub fn delete_menu_message() -> String {
    format!(
        "{}Select a conversation to delete from the list below.{NAVIGATION_FOOTER}",
        header("Delete Conversation")
    )
}

pub fn delete_menu_empty() -> String {
    format!(
        "{}No conversations to delete.{NAVIGATION_FOOTER}",
        header("Delete Conversation")
    )
}

pub fn delete_confirm(title: &str) -> String {
    let title = escape_markdown(title);
    format!("{}Permanently delete _{title}_?", header("Delete Conversation"))
}

pub fn delete_success() -> String {
    format!(
        "{}Conversation has been deleted.{NAVIGATION_FOOTER}",
        header("Delete Conversation")
    )
}

pub const USER_MESSAGE_HEADER: &str = "👤 *You*:\n";
pub const BOT_MESSAGE_HEADER: &str = "🤖 *StudyBot*:\n";

pub fn reply_footer() -> String {
    format!("\n{DIVIDER}\nSend a prompt to continue the conversation.{NAVIGATION_FOOTER}")
}

pub const THINKING_INDICATOR: &str = "Thinking...";
pub const LOADING_INDICATOR: &str = "Loading...";

// Admin flows.

pub fn admin_menu_message() -> String {
    format!(
        "{}Select an operation below to proceed.{NAVIGATION_FOOTER}",
        header("Admin Menu")
    )
}

pub fn add_user_prompt() -> String {
    format!(
        "{}Send the user ID to whitelist.{NAVIGATION_FOOTER}",
        header("Add Whitelist User")
    )
}

pub fn add_user_success(user_id: i64) -> String {
    format!(
        "{}Successfully added user _{user_id}_ to the whitelist.",
        header("Add Whitelist User")
    )
}

pub fn remove_user_menu() -> String {
    format!(
        "{}Select a user to remove from the whitelist.{NAVIGATION_FOOTER}",
        header("Remove Whitelist User")
    )
}

pub fn remove_user_menu_empty() -> String {
    format!(
        "{}No users in the whitelist to remove.{NAVIGATION_FOOTER}",
        header("Remove Whitelist User")
    )
}

pub fn remove_user_success(user_id: i64) -> String {
    format!(
        "{}Successfully removed user _{user_id}_ from the whitelist.{NAVIGATION_FOOTER}",
        header("Remove Whitelist User")
    )
}

pub fn remove_user_confirm(user_id: i64) -> String {
    format!(
        "{}Permanently remove user _{user_id}_?",
        header("Remove Whitelist User")
    )
}

pub fn show_users_message(user_ids: &[i64]) -> String {
    let mut text = header("Show Whitelist Users");
    for user_id in user_ids {
        text.push_str(&format!("{user_id}\n"));
    }
    text.push_str(DIVIDER);
    text.push_str(NAVIGATION_FOOTER);
    text
}

pub fn show_users_empty() -> String {
    format!(
        "{}No users in the whitelist at the moment.{NAVIGATION_FOOTER}",
        header("Show Whitelist Users")
    )
}

// Errors.

pub fn not_whitelisted_error() -> String {
    format!("{}You are not whitelisted to use this bot.", header("Error"))
}

pub fn invalid_input_error() -> String {
    format!(
        "{}Invalid input. Please use the buttons provided.",
        header("Error")
    )
}

pub fn invalid_command_error() -> String {
    format!(
        "{}Invalid command. Please refer to the menu for the available commands.",
        header("Error")
    )
}

pub fn invalid_user_id_error() -> String {
    format!(
        "{}Invalid user ID. Please send a valid user ID (numeric digits only).",
        header("Error")
    )
}

pub fn not_admin_error() -> String {
    format!(
        "{}You do not have permission to use this command.",
        header("Error")
    )
}

pub fn admin_not_idle_error() -> String {
    format!(
        "{}*/admin* is only available in the idle state.",
        header("Error")
    )
}

pub fn please_retry_error() -> String {
    format!("{}Something went wrong. Please try again.", header("Error"))
}
