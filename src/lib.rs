//! FareBuddy Telegram Bot
//!
//! A Telegram bot that guides users through multi-step flight searches
//! against a low-cost fare API: standard, flexible, "anywhere" and top-3
//! destination flows, with saved searches, currency rates, weather lookup
//! and Stars donations.

#![allow(non_snake_case)]

pub mod catalog;
pub mod config;
pub mod database;
pub mod flights;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{FareBuddyError, Result};

// Re-export main components for easy access
pub use catalog::AirportCatalog;
pub use database::DatabaseService;
pub use services::ServiceFactory;
pub use state::{Machine, SearchParameters, StateStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
