//! Search history repository implementation
//!
//! Append-only snapshots of executed searches. The latest row per user backs
//! the "repeat last search" command; the aggregates back the admin stats.

use chrono::Utc;
use sqlx::PgPool;

use crate::models::{DepartureCount, FlowCount, SearchRecord};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct SearchHistoryRepository {
    pool: PgPool,
}

impl SearchHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn save(
        &self,
        user_id: i64,
        flow: &str,
        departure_iata: Option<&str>,
        params: serde_json::Value,
    ) -> Result<SearchRecord> {
        let record = sqlx::query_as::<_, SearchRecord>(
            r#"
            INSERT INTO search_history (user_id, flow, departure_iata, params, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, flow, departure_iata, params, created_at
            "#,
        )
        .bind(user_id)
        .bind(flow)
        .bind(departure_iata)
        .bind(params)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Most recent snapshot for a user
    pub async fn load_latest(&self, user_id: i64) -> Result<Option<SearchRecord>> {
        let record = sqlx::query_as::<_, SearchRecord>(
            "SELECT id, user_id, flow, departure_iata, params, created_at FROM search_history WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn count_total(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM search_history")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn count_last_7_days(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM search_history WHERE created_at > NOW() - INTERVAL '7 days'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    pub async fn count_by_flow(&self) -> Result<Vec<FlowCount>> {
        let counts = sqlx::query_as::<_, FlowCount>(
            "SELECT flow, COUNT(*) AS count FROM search_history GROUP BY flow ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    pub async fn top_departures(&self, limit: i64) -> Result<Vec<DepartureCount>> {
        let counts = sqlx::query_as::<_, DepartureCount>(
            r#"
            SELECT departure_iata, COUNT(*) AS count
            FROM search_history
            WHERE departure_iata IS NOT NULL
            GROUP BY departure_iata
            ORDER BY count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
