//! Flight offer domain types
//!
//! Offers are immutable once returned by the fare API. A missing price keeps
//! the offer out of minimum computation but not out of unfiltered output.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single directional flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub flight_number: String,
    pub origin: String,
    pub origin_city: String,
    pub destination: String,
    pub destination_city: String,
    pub departure_time: NaiveDateTime,
    pub price: Option<f64>,
    pub currency: String,
}

/// One offer as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlightOffer {
    OneWay(FlightLeg),
    RoundTrip {
        outbound: FlightLeg,
        inbound: FlightLeg,
    },
}

impl FlightOffer {
    /// Own price, or outbound plus inbound; `None` when any leg is unpriced
    pub fn total_price(&self) -> Option<f64> {
        match self {
            FlightOffer::OneWay(leg) => leg.price,
            FlightOffer::RoundTrip { outbound, inbound } => {
                Some(outbound.price? + inbound.price?)
            }
        }
    }

    pub fn outbound(&self) -> &FlightLeg {
        match self {
            FlightOffer::OneWay(leg) => leg,
            FlightOffer::RoundTrip { outbound, .. } => outbound,
        }
    }

    /// IATA code of the outbound destination
    pub fn destination(&self) -> &str {
        &self.outbound().destination
    }

    pub fn destination_city(&self) -> &str {
        &self.outbound().destination_city
    }

    pub fn currency(&self) -> &str {
        &self.outbound().currency
    }

    /// Calendar date the trip starts, used for bucketing results
    pub fn departure_date(&self) -> NaiveDate {
        self.outbound().departure_time.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(price: Option<f64>) -> FlightLeg {
        FlightLeg {
            flight_number: "FR 1926".to_string(),
            origin: "DUB".to_string(),
            origin_city: "Dublin".to_string(),
            destination: "AGP".to_string(),
            destination_city: "Malaga".to_string(),
            departure_time: NaiveDate::from_ymd_opt(2025, 9, 15)
                .unwrap()
                .and_hms_opt(6, 25, 0)
                .unwrap(),
            price,
            currency: "EUR".to_string(),
        }
    }

    #[test]
    fn test_one_way_total_is_own_price() {
        let offer = FlightOffer::OneWay(leg(Some(39.99)));
        assert_eq!(offer.total_price(), Some(39.99));
    }

    #[test]
    fn test_round_trip_total_sums_both_legs() {
        let offer = FlightOffer::RoundTrip {
            outbound: leg(Some(39.99)),
            inbound: leg(Some(25.01)),
        };
        assert_eq!(offer.total_price(), Some(65.0));
    }

    #[test]
    fn test_missing_leg_price_yields_no_total() {
        let offer = FlightOffer::RoundTrip {
            outbound: leg(Some(39.99)),
            inbound: leg(None),
        };
        assert_eq!(offer.total_price(), None);
    }
}
