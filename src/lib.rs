//! Desk Assistant: routes typed or spoken commands to desktop actions.
//!
//! A command is normalized, matched against a fixed, priority-ordered set
//! of intents, and handed to the handler for that intent. Handlers talk to
//! the outside world through traits collected in [`context::AssistantContext`].

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod ipc;
pub mod logging;
pub mod sounds;
pub mod speech;
pub mod store;
