//! Repository implementations for database operations

pub mod search_history;
pub mod user;

pub use search_history::SearchHistoryRepository;
pub use user::UserRepository;
