//! Fare API client
//!
//! Thin reqwest wrapper over the fare-finder HTTP endpoints. One-way and
//! round-trip queries share a query object; the wire layer stays private and
//! callers only ever see `FlightOffer`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::FlightsConfig;
use crate::utils::errors::{FareBuddyError, Result};
use super::models::{FlightLeg, FlightOffer};

/// One gateway query
#[derive(Debug, Clone)]
pub struct FareQuery {
    pub origin: String,
    /// `None` searches every destination
    pub destination: Option<String>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub return_from: Option<NaiveDate>,
    pub return_to: Option<NaiveDate>,
    pub max_price: Option<f64>,
}

impl FareQuery {
    pub fn is_round_trip(&self) -> bool {
        self.return_from.is_some() && self.return_to.is_some()
    }
}

#[derive(Clone)]
pub struct FareClient {
    http: reqwest::Client,
    base_url: String,
    currency: String,
}

impl FareClient {
    pub fn new(config: &FlightsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
        })
    }

    /// Run one query and map the wire fares into offers
    pub async fn search(&self, query: &FareQuery) -> Result<Vec<FlightOffer>> {
        let url = self.build_url(query)?;
        debug!(url = %url, "Querying fare API");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FareBuddyError::FareApi(format!(
                "fare API returned {status}"
            )));
        }

        let body: FaresResponse = response.json().await?;
        let offers = body
            .fares
            .into_iter()
            .map(|fare| match fare.inbound {
                Some(inbound) => FlightOffer::RoundTrip {
                    outbound: fare.outbound.into_leg(),
                    inbound: inbound.into_leg(),
                },
                None => FlightOffer::OneWay(fare.outbound.into_leg()),
            })
            .collect::<Vec<_>>();

        debug!(count = offers.len(), "Fare API returned offers");
        Ok(offers)
    }

    fn build_url(&self, query: &FareQuery) -> Result<Url> {
        let endpoint = if query.is_round_trip() {
            "roundTripFares"
        } else {
            "oneWayFares"
        };
        let mut url = Url::parse(&format!("{}/{endpoint}", self.base_url))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("departureAirportIataCode", &query.origin)
                .append_pair("outboundDepartureDateFrom", &query.date_from.to_string())
                .append_pair("outboundDepartureDateTo", &query.date_to.to_string())
                .append_pair("currency", &self.currency)
                .append_pair("market", "en-gb");

            if let Some(destination) = &query.destination {
                pairs.append_pair("arrivalAirportIataCode", destination);
            }
            if let Some(max_price) = query.max_price {
                pairs.append_pair("priceValueTo", &format!("{max_price:.2}"));
            }
            if let (Some(from), Some(to)) = (query.return_from, query.return_to) {
                pairs
                    .append_pair("inboundDepartureDateFrom", &from.to_string())
                    .append_pair("inboundDepartureDateTo", &to.to_string());
            }
        }

        Ok(url)
    }
}

impl std::fmt::Debug for FareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FareClient")
            .field("base_url", &self.base_url)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

// Wire format of the fare-finder endpoints

#[derive(Debug, Deserialize)]
struct FaresResponse {
    fares: Vec<WireFare>,
}

#[derive(Debug, Deserialize)]
struct WireFare {
    outbound: WireLeg,
    inbound: Option<WireLeg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLeg {
    departure_airport: WireAirport,
    arrival_airport: WireAirport,
    departure_date: NaiveDateTime,
    price: Option<WirePrice>,
    flight_number: Option<String>,
}

impl WireLeg {
    fn into_leg(self) -> FlightLeg {
        let (price, currency) = match self.price {
            Some(price) => (Some(price.value), price.currency_code),
            None => (None, String::new()),
        };
        FlightLeg {
            flight_number: self.flight_number.unwrap_or_default(),
            origin: self.departure_airport.iata_code,
            origin_city: self.departure_airport.name,
            destination: self.arrival_airport.iata_code,
            destination_city: self.arrival_airport.name,
            departure_time: self.departure_date,
            price,
            currency,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAirport {
    iata_code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePrice {
    value: f64,
    currency_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FareClient {
        FareClient::new(&FlightsConfig {
            api_url: "https://fares.example.com/v4/".to_string(),
            timeout_seconds: 15,
            day_offset: 2,
            currency: "EUR".to_string(),
            max_rendered_offers: 30,
        })
        .unwrap()
    }

    #[test]
    fn test_one_way_url_omits_return_window() {
        let url = client()
            .build_url(&FareQuery {
                origin: "DUB".to_string(),
                destination: Some("AGP".to_string()),
                date_from: NaiveDate::from_ymd_opt(2025, 9, 13).unwrap(),
                date_to: NaiveDate::from_ymd_opt(2025, 9, 17).unwrap(),
                return_from: None,
                return_to: None,
                max_price: Some(50.0),
            })
            .unwrap();

        assert!(url.path().ends_with("/oneWayFares"));
        let query = url.query().unwrap();
        assert!(query.contains("departureAirportIataCode=DUB"));
        assert!(query.contains("arrivalAirportIataCode=AGP"));
        assert!(query.contains("outboundDepartureDateFrom=2025-09-13"));
        assert!(query.contains("priceValueTo=50.00"));
        assert!(!query.contains("inboundDepartureDateFrom"));
    }

    #[test]
    fn test_round_trip_url_carries_both_windows() {
        let url = client()
            .build_url(&FareQuery {
                origin: "DUB".to_string(),
                destination: None,
                date_from: NaiveDate::from_ymd_opt(2025, 9, 13).unwrap(),
                date_to: NaiveDate::from_ymd_opt(2025, 9, 13).unwrap(),
                return_from: Some(NaiveDate::from_ymd_opt(2025, 9, 20).unwrap()),
                return_to: Some(NaiveDate::from_ymd_opt(2025, 9, 24).unwrap()),
                max_price: None,
            })
            .unwrap();

        assert!(url.path().ends_with("/roundTripFares"));
        let query = url.query().unwrap();
        assert!(query.contains("inboundDepartureDateFrom=2025-09-20"));
        assert!(query.contains("inboundDepartureDateTo=2025-09-24"));
        assert!(!query.contains("arrivalAirportIataCode"));
        assert!(!query.contains("priceValueTo"));
    }

    #[test]
    fn test_wire_fares_deserialize() {
        let body = r#"{
            "fares": [{
                "outbound": {
                    "departureAirport": {"iataCode": "DUB", "name": "Dublin"},
                    "arrivalAirport": {"iataCode": "AGP", "name": "Malaga"},
                    "departureDate": "2025-09-15T06:25:00",
                    "price": {"value": 39.99, "currencyCode": "EUR"},
                    "flightNumber": "FR 1926"
                },
                "inbound": null
            }]
        }"#;
        let parsed: FaresResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.fares.len(), 1);
        let leg = parsed.fares.into_iter().next().unwrap().outbound.into_leg();
        assert_eq!(leg.origin, "DUB");
        assert_eq!(leg.price, Some(39.99));
        assert_eq!(leg.departure_time.date().to_string(), "2025-09-15");
    }
}
