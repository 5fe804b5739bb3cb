//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub flights: FlightsConfig,
    pub rates: RatesConfig,
    pub weather: WeatherConfig,
    pub donations: DonationsConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    pub admin_ids: Vec<i64>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Fare API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlightsConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
    /// Each search queries the target date plus/minus this many days
    pub day_offset: u32,
    pub currency: String,
    /// Rendering cap for a single result message
    pub max_rendered_offers: usize,
}

/// Currency rates configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatesConfig {
    pub api_url: String,
    pub base_currency: String,
    pub symbols: Vec<String>,
    pub cache_ttl_seconds: u64,
}

/// Weather lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub timeout_seconds: u64,
}

/// Stars donation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DonationsConfig {
    pub enabled: bool,
    /// Donation amounts offered, in Telegram Stars
    pub amounts: Vec<u32>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("FAREBUDDY"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::FareBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_ids: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/farebuddy".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "farebuddy:".to_string(),
                ttl_seconds: 3600,
            },
            flights: FlightsConfig {
                api_url: "https://services-api.ryanair.com/farfnd/v4".to_string(),
                timeout_seconds: 15,
                day_offset: 2,
                currency: "EUR".to_string(),
                max_rendered_offers: 30,
            },
            rates: RatesConfig {
                api_url: "https://open.er-api.com/v6/latest".to_string(),
                base_currency: "EUR".to_string(),
                symbols: vec!["USD".to_string(), "GBP".to_string(), "PLN".to_string()],
                cache_ttl_seconds: 3600,
            },
            weather: WeatherConfig {
                geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
                forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
                timeout_seconds: 10,
            },
            donations: DonationsConfig {
                enabled: true,
                amounts: vec![25, 50, 100],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/farebuddy".to_string(),
            },
        }
    }
}
