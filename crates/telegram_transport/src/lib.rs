//! telegram_transport - Outbound message transport
//!
//! Defines the narrow `ChatTransport` seam the bot core talks through and
//! implements it against the Telegram Bot API. Also carries the inline
//! keyboard model, long-message chunking, and the long-poll wire types.

pub mod markup;
pub mod telegram;
pub mod text;
pub mod transport;
pub mod wire;

// Re-exports
pub use markup::{InlineButton, InlineKeyboard};
pub use telegram::TelegramApi;
pub use text::{escape_markdown, split_message};
pub use transport::{ChatTransport, Result, TransportError};
