//! Currency rates service
//!
//! Fetches exchange rates over HTTP and caches the filtered snapshot in
//! Redis with a TTL, so repeated /rates requests within the window never hit
//! the upstream API.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::utils::errors::{FareBuddyError, Result};

/// One cached rates snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesSnapshot {
    pub base: String,
    /// (currency code, units per base) in configured symbol order
    pub rates: Vec<(String, f64)>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RatesApiResponse {
    result: String,
    base_code: String,
    rates: HashMap<String, f64>,
}

#[derive(Clone)]
pub struct RatesService {
    client: Client,
    redis_client: redis::Client,
    settings: Settings,
}

impl RatesService {
    pub fn new(redis_client: redis::Client, settings: Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            redis_client,
            settings,
        })
    }

    /// Cached snapshot if fresh, otherwise a new fetch
    pub async fn get_rates(&self) -> Result<RatesSnapshot> {
        if let Some(cached) = self.cached_snapshot().await? {
            debug!(base = %cached.base, "Serving cached currency rates");
            return Ok(cached);
        }

        let snapshot = self.fetch_rates().await?;
        self.cache_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    async fn fetch_rates(&self) -> Result<RatesSnapshot> {
        let config = &self.settings.rates;
        let url = format!("{}/{}", config.api_url.trim_end_matches('/'), config.base_currency);
        debug!(url = %url, "Fetching currency rates");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FareBuddyError::ServiceUnavailable(format!(
                "rates API returned {}",
                response.status()
            )));
        }

        let body: RatesApiResponse = response.json().await?;
        if body.result != "success" {
            return Err(FareBuddyError::ServiceUnavailable(
                "rates API reported failure".to_string(),
            ));
        }

        let rates = config
            .symbols
            .iter()
            .filter_map(|symbol| body.rates.get(symbol).map(|value| (symbol.clone(), *value)))
            .collect();

        Ok(RatesSnapshot {
            base: body.base_code,
            rates,
            fetched_at: Utc::now(),
        })
    }

    async fn cached_snapshot(&self) -> Result<Option<RatesSnapshot>> {
        let mut conn = self.redis_client.get_async_connection().await?;
        let cached: Option<String> = conn.get(self.cache_key()).await?;
        match cached {
            Some(data) => Ok(serde_json::from_str(&data).ok()),
            None => Ok(None),
        }
    }

    async fn cache_snapshot(&self, snapshot: &RatesSnapshot) -> Result<()> {
        let mut conn = self.redis_client.get_async_connection().await?;
        let serialized = serde_json::to_string(snapshot)?;
        conn.set_ex::<_, _, ()>(
            self.cache_key(),
            serialized,
            self.settings.rates.cache_ttl_seconds,
        )
        .await?;
        Ok(())
    }

    fn cache_key(&self) -> String {
        format!(
            "{}rates:{}",
            self.settings.redis.prefix, self.settings.rates.base_currency
        )
    }
}

impl std::fmt::Debug for RatesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatesService")
            .field("base", &self.settings.rates.base_currency)
            .finish_non_exhaustive()
    }
}
