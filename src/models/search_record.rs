//! Saved search snapshot and usage-statistics models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One executed search, stored append-only
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: i64,
    /// Telegram user id, not the internal user row id
    pub user_id: i64,
    pub flow: String,
    pub departure_iata: Option<String>,
    /// Full `SearchParameters` snapshot
    pub params: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Searches per flow, for the admin stats view
#[derive(Debug, Clone, FromRow)]
pub struct FlowCount {
    pub flow: String,
    pub count: i64,
}

/// Searches per departure airport
#[derive(Debug, Clone, FromRow)]
pub struct DepartureCount {
    pub departure_iata: String,
    pub count: i64,
}

/// Aggregated usage numbers shown to admins
#[derive(Debug, Clone)]
pub struct UsageStats {
    pub total_users: i64,
    pub total_searches: i64,
    pub searches_last_7_days: i64,
    pub by_flow: Vec<FlowCount>,
    pub top_departures: Vec<DepartureCount>,
}
