//! Search orchestration
//!
//! Turns completed `SearchParameters` into gateway queries: one call per
//! calendar day in the offset window around a fixed date, or a single
//! one-year window when no date was chosen. Calls run sequentially and
//! per-day failures only surface when nothing at all was collected.

use chrono::{Duration, NaiveDate};
use tracing::warn;

use crate::catalog::AirportCatalog;
use crate::config::FlightsConfig;
use crate::state::SearchParameters;
use crate::utils::errors::{FareBuddyError, Result};
use super::client::{FareClient, FareQuery};
use super::ranking::OffersByDate;

/// Days queried around a fixed target date, clamped to `min`
fn day_window(target: NaiveDate, offset: u32, min: NaiveDate) -> Vec<NaiveDate> {
    let start = target - Duration::days(offset as i64);
    let end = target + Duration::days(offset as i64);
    let mut days = Vec::new();
    let mut day = std::cmp::max(start, min);
    while day <= end {
        days.push(day);
        day += Duration::days(1);
    }
    days
}

fn return_window(
    params: &SearchParameters,
    outbound_day: NaiveDate,
    offset: u32,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match params.return_date {
        Some(return_date) => {
            let from = std::cmp::max(return_date - Duration::days(offset as i64), outbound_day);
            let to = std::cmp::max(return_date + Duration::days(offset as i64), outbound_day);
            (Some(from), Some(to))
        }
        None => (None, None),
    }
}

/// Run the primary search for one origin
pub async fn run_search(
    client: &FareClient,
    params: &SearchParameters,
    config: &FlightsConfig,
    today: NaiveDate,
) -> Result<OffersByDate> {
    let origin = params
        .departure_iata
        .clone()
        .ok_or(FareBuddyError::MissingField("departure airport"))?;
    run_search_from(client, params, config, today, &origin).await
}

/// Re-run the search across every other airport in the departure country,
/// merging whatever each origin returns
pub async fn run_alternatives_search(
    client: &FareClient,
    catalog: &AirportCatalog,
    params: &SearchParameters,
    config: &FlightsConfig,
    today: NaiveDate,
) -> Result<OffersByDate> {
    let origin = params
        .departure_iata
        .as_deref()
        .ok_or(FareBuddyError::MissingField("departure airport"))?;

    let mut merged = OffersByDate::new();
    let mut last_error = None;
    for airport in catalog.alternatives(origin) {
        match run_search_from(client, params, config, today, &airport.iata).await {
            Ok(offers) => {
                for (date, day_offers) in offers {
                    merged.entry(date).or_default().extend(day_offers);
                }
            }
            Err(e) => {
                warn!(origin = %airport.iata, error = %e, "Alternative origin search failed");
                last_error = Some(e);
            }
        }
    }

    match (merged.is_empty(), last_error) {
        (true, Some(e)) => Err(e),
        _ => Ok(merged),
    }
}

async fn run_search_from(
    client: &FareClient,
    params: &SearchParameters,
    config: &FlightsConfig,
    today: NaiveDate,
    origin: &str,
) -> Result<OffersByDate> {
    let mut collected = OffersByDate::new();
    let mut last_error = None;

    match params.departure_date {
        Some(target) => {
            for day in day_window(target, config.day_offset, today) {
                let (return_from, return_to) = return_window(params, day, config.day_offset);
                let query = FareQuery {
                    origin: origin.to_string(),
                    destination: params.arrival_iata.clone(),
                    date_from: day,
                    date_to: day,
                    return_from,
                    return_to,
                    max_price: params.max_price(),
                };
                match client.search(&query).await {
                    Ok(offers) => bucket(&mut collected, offers),
                    // Partial results beat none; keep querying the window
                    Err(e) => {
                        warn!(origin, date = %day, error = %e, "Day query failed");
                        last_error = Some(e);
                    }
                }
            }
        }
        None => {
            let horizon = today + Duration::days(365);
            let (return_from, return_to) = if params.one_way {
                (None, None)
            } else {
                (Some(today), Some(horizon))
            };
            let query = FareQuery {
                origin: origin.to_string(),
                destination: params.arrival_iata.clone(),
                date_from: today,
                date_to: horizon,
                return_from,
                return_to,
                max_price: params.max_price(),
            };
            match client.search(&query).await {
                Ok(offers) => bucket(&mut collected, offers),
                Err(e) => last_error = Some(e),
            }
        }
    }

    match (collected.is_empty(), last_error) {
        (true, Some(e)) => Err(e),
        _ => Ok(collected),
    }
}

fn bucket(collected: &mut OffersByDate, offers: Vec<super::models::FlightOffer>) {
    for offer in offers {
        collected.entry(offer.departure_date()).or_default().push(offer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_spans_offset_both_sides() {
        let days = day_window(date(2025, 9, 15), 2, date(2025, 8, 26));
        assert_eq!(days.first(), Some(&date(2025, 9, 13)));
        assert_eq!(days.last(), Some(&date(2025, 9, 17)));
        assert_eq!(days.len(), 5);
    }

    #[test]
    fn test_window_clamped_to_today() {
        let days = day_window(date(2025, 8, 27), 2, date(2025, 8, 26));
        assert_eq!(days.first(), Some(&date(2025, 8, 26)));
        assert_eq!(days.last(), Some(&date(2025, 8, 29)));
    }

    #[test]
    fn test_return_window_never_precedes_outbound_day() {
        let mut params = SearchParameters::new(7);
        params.return_date = Some(date(2025, 9, 16));

        let (from, to) = return_window(&params, date(2025, 9, 17), 2);
        assert_eq!(from, Some(date(2025, 9, 17)));
        assert_eq!(to, Some(date(2025, 9, 18)));
    }
}
