//! Error handling for FareBuddy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for FareBuddy application
#[derive(Error, Debug)]
pub enum FareBuddyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Fare API error: {0}")]
    FareApi(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Missing search field: {0}")]
    MissingField(&'static str),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for FareBuddy operations
pub type Result<T> = std::result::Result<T, FareBuddyError>;

impl FareBuddyError {
    /// Whether the conversation can continue after this error.
    ///
    /// Input problems re-prompt the current step; everything else terminates
    /// the conversation with a generic message and clears its parameters.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FareBuddyError::InvalidInput(_))
    }
}
