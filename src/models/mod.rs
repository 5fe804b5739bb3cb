//! Database-backed domain models

pub mod search_record;
pub mod user;

pub use search_record::{DepartureCount, FlowCount, SearchRecord, UsageStats};
pub use user::{CreateUserRequest, User};
