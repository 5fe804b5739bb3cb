//! Weather lookup service
//!
//! Two-step HTTP lookup: geocode the city name, then read the current
//! conditions at the resolved coordinates.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::WeatherConfig;
use crate::utils::errors::{FareBuddyError, Result};

/// Current conditions for one resolved city
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub country: String,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub description: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: u32,
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    client: Client,
    config: WeatherConfig,
}

impl WeatherService {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    /// Resolve a city name and report its current conditions
    pub async fn lookup(&self, city: &str) -> Result<WeatherReport> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FareBuddyError::InvalidInput(
                "Send a city name, e.g. /weather Malaga".to_string(),
            ));
        }

        let place = self.geocode(city).await?;
        debug!(city = %place.name, lat = place.latitude, lon = place.longitude, "City geocoded");

        let forecast: ForecastResponse = self
            .client
            .get(&self.config.forecast_url)
            .query(&[
                ("latitude", place.latitude.to_string()),
                ("longitude", place.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(WeatherReport {
            city: place.name,
            country: place.country.unwrap_or_default(),
            temperature_c: forecast.current_weather.temperature,
            wind_speed_kmh: forecast.current_weather.windspeed,
            description: weather_description(forecast.current_weather.weathercode),
        })
    }

    async fn geocode(&self, city: &str) -> Result<GeocodingResult> {
        let response: GeocodingResponse = self
            .client
            .get(&self.config.geocoding_url)
            .query(&[("name", city), ("count", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .results
            .and_then(|mut results| (!results.is_empty()).then(|| results.remove(0)))
            .ok_or_else(|| {
                FareBuddyError::InvalidInput(format!("I could not find a city named \"{city}\"."))
            })
    }
}

/// WMO weather interpretation codes, collapsed to short labels
fn weather_description(code: u32) -> &'static str {
    match code {
        0 => "clear sky",
        1..=3 => "partly cloudy",
        45 | 48 => "fog",
        51..=57 => "drizzle",
        61..=67 => "rain",
        71..=77 => "snow",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95..=99 => "thunderstorm",
        _ => "unknown conditions",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_codes_map_to_labels() {
        assert_eq!(weather_description(0), "clear sky");
        assert_eq!(weather_description(2), "partly cloudy");
        assert_eq!(weather_description(63), "rain");
        assert_eq!(weather_description(96), "thunderstorm");
        assert_eq!(weather_description(42), "unknown conditions");
    }
}
