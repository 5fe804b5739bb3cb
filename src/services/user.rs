//! User service implementation

use tracing::debug;

use crate::database::repositories::UserRepository;
use crate::models::User;
use crate::utils::errors::Result;

/// User registration and lookup
#[derive(Debug, Clone)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    /// Register a new user or refresh an existing profile
    pub async fn register_or_get_user(
        &self,
        telegram_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<User> {
        debug!(telegram_id, "Registering or refreshing user");
        self.user_repository
            .upsert(crate::models::CreateUserRequest {
                telegram_id,
                username,
                first_name,
                last_name,
            })
            .await
    }

    pub async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        self.user_repository.find_by_telegram_id(telegram_id).await
    }
}
