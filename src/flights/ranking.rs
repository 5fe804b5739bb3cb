//! Pure result ranking and filtering
//!
//! Everything here operates on an already-fetched `OffersByDate` map and has
//! no side effects, so the filtering rules are testable without a network.

use std::collections::BTreeMap;
use chrono::NaiveDate;

use super::models::FlightOffer;

/// Offers bucketed by outbound departure date
pub type OffersByDate = BTreeMap<NaiveDate, Vec<FlightOffer>>;

/// The cheapest destination summaries for the top-3 flow
#[derive(Debug, Clone, PartialEq)]
pub struct TopDestination {
    pub destination: String,
    pub destination_city: String,
    pub best: FlightOffer,
}

pub fn total_offers(offers: &OffersByDate) -> usize {
    offers.values().map(Vec::len).sum()
}

/// Minimum total price across the whole map; unpriced offers never count
pub fn global_minimum(offers: &OffersByDate) -> Option<f64> {
    offers
        .values()
        .flatten()
        .filter_map(FlightOffer::total_price)
        .min_by(|a, b| a.total_cmp(b))
}

/// Keep only offers whose total equals the global minimum, ties included.
/// Date grouping and within-date order survive; emptied dates are dropped.
pub fn cheapest_only(offers: OffersByDate) -> OffersByDate {
    let Some(min) = global_minimum(&offers) else {
        return OffersByDate::new();
    };
    offers
        .into_iter()
        .filter_map(|(date, day_offers)| {
            let kept: Vec<_> = day_offers
                .into_iter()
                .filter(|offer| offer.total_price() == Some(min))
                .collect();
            (!kept.is_empty()).then_some((date, kept))
        })
        .collect()
}

/// Cap the map to the `cap` globally-cheapest offers, preserving date grouping
/// and within-date order. Unpriced offers rank last and are dropped first.
/// Returns the capped map and how many offers were cut.
pub fn cap_cheapest(offers: OffersByDate, cap: usize) -> (OffersByDate, usize) {
    let total = total_offers(&offers);
    if total <= cap {
        return (offers, 0);
    }

    // Price threshold: the cap-th cheapest total across all dates
    let mut totals: Vec<Option<f64>> = offers
        .values()
        .flatten()
        .map(FlightOffer::total_price)
        .collect();
    totals.sort_by(|a, b| match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    let threshold = totals[cap - 1];

    let mut remaining = cap;
    let capped: OffersByDate = offers
        .into_iter()
        .filter_map(|(date, day_offers)| {
            let kept: Vec<_> = day_offers
                .into_iter()
                .filter(|offer| {
                    if remaining == 0 {
                        return false;
                    }
                    let keep = match (offer.total_price(), threshold) {
                        (Some(price), Some(limit)) => price <= limit,
                        (Some(_), None) => true,
                        // Unpriced offers survive only when the threshold
                        // itself fell into the unpriced tail
                        (None, limit) => limit.is_none(),
                    };
                    if keep {
                        remaining -= 1;
                    }
                    keep
                })
                .collect();
            (!kept.is_empty()).then_some((date, kept))
        })
        .collect();

    let truncated = total - total_offers(&capped);
    (capped, truncated)
}

/// Rank destinations by their cheapest priced offer and keep the `n` best
pub fn top_destinations(offers: &OffersByDate, n: usize) -> Vec<TopDestination> {
    let mut best: BTreeMap<&str, &FlightOffer> = BTreeMap::new();
    for offer in offers.values().flatten() {
        if offer.total_price().is_none() {
            continue;
        }
        best.entry(offer.destination())
            .and_modify(|current| {
                if offer.total_price() < current.total_price() {
                    *current = offer;
                }
            })
            .or_insert(offer);
    }

    let mut ranked: Vec<TopDestination> = best
        .into_values()
        .map(|offer| TopDestination {
            destination: offer.destination().to_string(),
            destination_city: offer.destination_city().to_string(),
            best: offer.clone(),
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.best
            .total_price()
            .partial_cmp(&b.best.total_price())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flights::models::FlightLeg;
    use chrono::NaiveDate;

    fn offer(destination: &str, day: u32, price: Option<f64>) -> FlightOffer {
        FlightOffer::OneWay(FlightLeg {
            flight_number: "FR 1926".to_string(),
            origin: "DUB".to_string(),
            origin_city: "Dublin".to_string(),
            destination: destination.to_string(),
            destination_city: destination.to_string(),
            departure_time: NaiveDate::from_ymd_opt(2025, 9, day)
                .unwrap()
                .and_hms_opt(6, 25, 0)
                .unwrap(),
            price,
            currency: "EUR".to_string(),
        })
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
    }

    #[test]
    fn test_cheapest_only_keeps_all_ties_across_dates() {
        let mut offers = OffersByDate::new();
        offers.insert(date(10), vec![offer("AGP", 10, Some(80.0)), offer("AGP", 10, Some(95.0))]);
        offers.insert(date(11), vec![offer("AGP", 11, Some(80.0)), offer("AGP", 11, Some(80.0))]);

        let filtered = cheapest_only(offers);
        assert_eq!(total_offers(&filtered), 3);
        assert_eq!(filtered[&date(10)].len(), 1);
        assert_eq!(filtered[&date(11)].len(), 2);
        assert!(filtered
            .values()
            .flatten()
            .all(|o| o.total_price() == Some(80.0)));
    }

    #[test]
    fn test_unpriced_offers_never_win_minimum() {
        let mut offers = OffersByDate::new();
        offers.insert(date(10), vec![offer("AGP", 10, None), offer("AGP", 10, Some(50.0))]);

        assert_eq!(global_minimum(&offers), Some(50.0));
        let filtered = cheapest_only(offers);
        assert_eq!(total_offers(&filtered), 1);
    }

    #[test]
    fn test_all_unpriced_yields_empty_cheapest_set() {
        let mut offers = OffersByDate::new();
        offers.insert(date(10), vec![offer("AGP", 10, None)]);

        assert_eq!(global_minimum(&offers), None);
        assert!(cheapest_only(offers).is_empty());
    }

    #[test]
    fn test_cap_keeps_globally_cheapest_preserving_grouping() {
        let mut offers = OffersByDate::new();
        offers.insert(date(10), vec![offer("AGP", 10, Some(30.0)), offer("AGP", 10, Some(90.0))]);
        offers.insert(date(11), vec![offer("AGP", 11, Some(40.0)), offer("AGP", 11, Some(85.0))]);

        let (capped, truncated) = cap_cheapest(offers, 2);
        assert_eq!(truncated, 2);
        assert_eq!(total_offers(&capped), 2);
        assert_eq!(capped[&date(10)][0].total_price(), Some(30.0));
        assert_eq!(capped[&date(11)][0].total_price(), Some(40.0));
    }

    #[test]
    fn test_cap_is_noop_under_limit() {
        let mut offers = OffersByDate::new();
        offers.insert(date(10), vec![offer("AGP", 10, Some(30.0))]);

        let (capped, truncated) = cap_cheapest(offers, 30);
        assert_eq!(truncated, 0);
        assert_eq!(total_offers(&capped), 1);
    }

    #[test]
    fn test_top_destinations_ranked_by_cheapest_offer() {
        let mut offers = OffersByDate::new();
        offers.insert(
            date(10),
            vec![
                offer("AGP", 10, Some(55.0)),
                offer("STN", 10, Some(20.0)),
                offer("KRK", 10, Some(35.0)),
                offer("AGP", 10, Some(25.0)),
                offer("BCN", 10, Some(60.0)),
            ],
        );

        let top = top_destinations(&offers, 3);
        let codes: Vec<&str> = top.iter().map(|t| t.destination.as_str()).collect();
        assert_eq!(codes, vec!["STN", "AGP", "KRK"]);
        assert_eq!(top[1].best.total_price(), Some(25.0));
    }
}
