//! bot_server - Event dispatch and per-state menu handlers
//!
//! Wires the session store, routing table, and the external collaborators
//! (transport, conversation store, whitelist, generator) into one
//! dispatcher that processes normalized inbound events.

pub mod dispatch;
pub mod handlers;
pub mod keyboards;
pub mod poller;
pub mod strings;

pub use dispatch::Dispatcher;
pub use handlers::{HandlerError, Handlers};
pub use poller::UpdatePoller;
