//! Conversation persistence
//!
//! Search parameters live in Redis between updates, keyed by user id. Every
//! write refreshes the TTL, and an expired record found on load is removed
//! before reporting "no conversation".

use redis::AsyncCommands;
use tracing::{debug, error, warn};

use crate::config::RedisConfig;
use crate::utils::errors::Result;
use super::context::SearchParameters;

/// Redis-backed store for in-flight conversations
#[derive(Clone)]
pub struct StateStorage {
    connection_manager: redis::aio::ConnectionManager,
    config: RedisConfig,
}

impl StateStorage {
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Persist the parameters, refreshing the TTL
    pub async fn save(&self, params: &SearchParameters) -> Result<()> {
        let key = self.context_key(params.user_id);
        let serialized = serde_json::to_string(params)?;

        let ttl_seconds = match params.expires_at {
            Some(expires_at) => {
                let remaining = (expires_at - chrono::Utc::now()).num_seconds();
                // Never write an already-dead key
                std::cmp::max(remaining, 60) as u64
            }
            None => self.config.ttl_seconds,
        };

        let mut conn = self.connection_manager.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await {
            error!(user_id = params.user_id, error = %e, "Failed to save conversation");
            return Err(e.into());
        }
        debug!(
            user_id = params.user_id,
            state = ?params.state,
            ttl_seconds,
            "Conversation saved"
        );
        Ok(())
    }

    /// Load the parameters, treating expired records as absent
    pub async fn load(&self, user_id: i64) -> Result<Option<SearchParameters>> {
        let key = self.context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await?;
        let Some(data) = serialized else {
            debug!(user_id, "No conversation in Redis");
            return Ok(None);
        };

        let params: SearchParameters = serde_json::from_str(&data)?;
        if params.is_expired() {
            warn!(user_id, "Conversation expired, removing");
            self.delete(user_id).await?;
            return Ok(None);
        }

        debug!(user_id, state = ?params.state, "Conversation loaded");
        Ok(Some(params))
    }

    pub async fn delete(&self, user_id: i64) -> Result<()> {
        let key = self.context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let deleted: u32 = conn.del(&key).await?;
        debug!(user_id, deleted, "Conversation delete");
        Ok(())
    }

    pub async fn exists(&self, user_id: i64) -> Result<bool> {
        let key = self.context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let exists: bool = conn.exists(&key).await?;
        Ok(exists)
    }

    /// Round-trip PING used by the startup health check
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn context_key(&self, user_id: i64) -> String {
        format!("{}context:{}", self.config.prefix, user_id)
    }
}

impl std::fmt::Debug for StateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStorage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
