//! # Session Manager
//!
//! Owns the per-user in-memory session records: menu state, active
//! conversation, the ledger of bot-sent message ids pending cleanup, and
//! activity timestamps. The store serializes all work for a given user
//! through a per-user lock so the dispatcher and the inactivity reaper can
//! never interleave on the same session.

pub mod reaper;
pub mod store;
pub mod structs;

// Re-exports
pub use reaper::{InactivityReaper, ReaperConfig};
pub use store::SessionStore;
pub use structs::Session;
