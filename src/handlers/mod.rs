//! Bot handlers module
//!
//! Telegram plumbing organized by update type: commands, inline-keyboard
//! callbacks and free-text messages, plus the shared keyboard/formatting
//! helpers.

pub mod callbacks;
pub mod commands;
pub mod keyboards;
pub mod messages;

pub use callbacks::handle_callback_query;
pub use messages::handle_message;
