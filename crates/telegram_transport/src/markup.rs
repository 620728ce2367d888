//! Inline keyboard model
//!
//! Serializes to the Telegram `InlineKeyboardMarkup` shape.

use serde::Serialize;

/// One button: a label and the callback data it sends back.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of inline buttons attached to a message.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of (label, callback data) buttons.
    pub fn row(mut self, buttons: &[(&str, &str)]) -> Self {
        self.inline_keyboard.push(
            buttons
                .iter()
                .map(|(text, data)| InlineButton::new(*text, *data))
                .collect(),
        );
        self
    }

    /// Append a single full-width button.
    pub fn button(self, text: &str, callback_data: &str) -> Self {
        self.row(&[(text, callback_data)])
    }
}
