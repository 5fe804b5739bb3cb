//! Database service layer
//!
//! High-level interface over the repositories; handlers never touch a
//! repository directly.

use crate::database::{DatabasePool, SearchHistoryRepository, UserRepository};
use crate::models::{CreateUserRequest, UsageStats, User};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub history: SearchHistoryRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            history: SearchHistoryRepository::new(pool),
        }
    }

    /// Register or refresh a user on first contact
    pub async fn initialize_user(
        &self,
        telegram_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<User> {
        self.users
            .upsert(CreateUserRequest {
                telegram_id,
                username,
                first_name,
                last_name,
            })
            .await
    }

    /// Aggregate numbers for the admin stats view
    pub async fn usage_stats(&self) -> Result<UsageStats> {
        Ok(UsageStats {
            total_users: self.users.count().await?,
            total_searches: self.history.count_total().await?,
            searches_last_7_days: self.history.count_last_7_days().await?,
            by_flow: self.history.count_by_flow().await?,
            top_departures: self.history.top_departures(5).await?,
        })
    }
}
