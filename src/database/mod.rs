//! Database module
//!
//! Connection pool, migrations and repositories.

pub mod connection;
pub mod repositories;
pub mod service;

pub use connection::{create_pool, health_check, run_migrations, DatabasePool};
pub use repositories::{SearchHistoryRepository, UserRepository};
pub use service::DatabaseService;
