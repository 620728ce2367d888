//! bot_state - Menu states, normalized events, and event routing
//!
//! This crate defines the per-user finite-state machine of the bot menu:
//! the state enum with its menu-tree layout, the normalized inbound event
//! shape, and the ordered routing table that maps (state, event) to a
//! handler route.

pub mod events;
pub mod routes;
pub mod states;

// Re-export commonly used types
pub use events::{EventKind, InboundEvent};
pub use routes::{route_event, Route};
pub use states::UserState;
