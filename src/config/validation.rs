//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{FareBuddyError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_flights_config(&settings.flights)?;
    validate_rates_config(&settings.rates)?;
    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(FareBuddyError::Config(
            "Bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(FareBuddyError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(FareBuddyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(FareBuddyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(FareBuddyError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate fare API configuration
fn validate_flights_config(config: &super::FlightsConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(FareBuddyError::Config(
            "Fare API URL is required".to_string()
        ));
    }

    if config.day_offset > 7 {
        return Err(FareBuddyError::Config(
            "Day offset must be 7 or less to keep per-search API calls bounded".to_string()
        ));
    }

    if config.max_rendered_offers == 0 {
        return Err(FareBuddyError::Config(
            "Rendering cap must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate currency rates configuration
fn validate_rates_config(config: &super::RatesConfig) -> Result<()> {
    if config.base_currency.len() != 3 {
        return Err(FareBuddyError::Config(
            "Base currency must be a three-letter code".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_fail_without_token() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_settings_valid_with_token() {
        let mut settings = Settings::default();
        settings.bot.token = "123456:TEST".to_string();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_excessive_day_offset_rejected() {
        let mut settings = Settings::default();
        settings.bot.token = "123456:TEST".to_string();
        settings.flights.day_offset = 30;
        assert!(validate_settings(&settings).is_err());
    }
}
