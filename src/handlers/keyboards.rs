//! Keyboard and message formatting
//!
//! Converts the machine's abstract step views into Telegram markup and
//! renders search results, stats, rates and weather as message text.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::flights::ranking::{OffersByDate, TopDestination};
use crate::flights::FlightOffer;
use crate::models::UsageStats;
use crate::services::{RatesSnapshot, WeatherReport};
use crate::state::StepView;
use crate::utils::helpers::{format_date, format_price};

/// Abstract keyboard rows to Telegram inline markup
pub fn to_markup(view: &StepView) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(view.keyboard.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.token.clone()))
            .collect::<Vec<_>>()
    }))
}

fn format_leg(leg: &crate::flights::FlightLeg) -> String {
    let price = match leg.price {
        Some(amount) => format_price(amount, &leg.currency),
        None => "price n/a".to_string(),
    };
    format!(
        "{} {} → {} ({}) · {}",
        leg.departure_time.format("%H:%M"),
        leg.origin,
        leg.destination,
        leg.destination_city,
        price
    )
}

fn format_offer(offer: &FlightOffer) -> String {
    match offer {
        FlightOffer::OneWay(leg) => format_leg(leg),
        FlightOffer::RoundTrip { outbound, inbound } => {
            let total = match offer.total_price() {
                Some(amount) => format_price(amount, offer.currency()),
                None => "price n/a".to_string(),
            };
            format!(
                "{}\n   ↩ {}\n   total {}",
                format_leg(outbound),
                format_leg(inbound),
                total
            )
        }
    }
}

/// Offers grouped under date headers, with a trailer when capped
pub fn format_results(offers: &OffersByDate, truncated: usize) -> String {
    let mut out = String::from("Here is what I found:\n");
    for (date, day_offers) in offers {
        out.push_str(&format!("\n📅 {}\n", format_date(*date)));
        for offer in day_offers {
            out.push_str(&format!("  {}\n", format_offer(offer)));
        }
    }
    if truncated > 0 {
        out.push_str(&format!("\n…and {truncated} more not shown."));
    }
    out
}

pub fn format_top3(top: &[TopDestination]) -> String {
    if top.is_empty() {
        return "😕 No destinations found.".to_string();
    }
    let medals = ["🥇", "🥈", "🥉"];
    let mut out = String::from("Top destinations by price:\n");
    for (i, entry) in top.iter().enumerate() {
        let medal = medals.get(i).copied().unwrap_or("•");
        out.push_str(&format!(
            "\n{medal} {} ({})\n  {}\n",
            entry.destination_city,
            entry.destination,
            format_offer(&entry.best)
        ));
    }
    out
}

pub fn format_rates(snapshot: &RatesSnapshot) -> String {
    let mut out = format!("💱 Exchange rates for 1 {}:\n", snapshot.base);
    for (code, value) in &snapshot.rates {
        out.push_str(&format!("  {code}: {value:.4}\n"));
    }
    out.push_str(&format!(
        "\nUpdated {}",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out
}

pub fn format_weather(report: &WeatherReport) -> String {
    format!(
        "🌤 {}, {}\n{}, {:.1}°C, wind {:.0} km/h",
        report.city, report.country, report.description, report.temperature_c, report.wind_speed_kmh
    )
}

pub fn format_stats(stats: &UsageStats) -> String {
    let mut out = format!(
        "📊 Usage\n\nUsers: {}\nSearches: {} ({} in the last 7 days)\n",
        stats.total_users, stats.total_searches, stats.searches_last_7_days
    );
    if !stats.by_flow.is_empty() {
        out.push_str("\nBy flow:\n");
        for flow in &stats.by_flow {
            out.push_str(&format!("  {}: {}\n", flow.flow, flow.count));
        }
    }
    if !stats.top_departures.is_empty() {
        out.push_str("\nTop departures:\n");
        for airport in &stats.top_departures {
            out.push_str(&format!("  {}: {}\n", airport.departure_iata, airport.count));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flights::FlightLeg;
    use crate::state::render::render_main_menu;
    use chrono::NaiveDate;

    fn one_way(price: Option<f64>) -> FlightOffer {
        FlightOffer::OneWay(FlightLeg {
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
        })
    }

    #[test]
    fn test_markup_mirrors_view_rows() {
        let view = render_main_menu();
        let markup = to_markup(&view);
        assert_eq!(markup.inline_keyboard.len(), view.keyboard.len());
        assert_eq!(markup.inline_keyboard[0].len(), 1);
    }

    #[test]
    fn test_results_grouped_by_date_with_trailer() {
        let mut offers = OffersByDate::new();
        offers.insert(NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(), vec![one_way(Some(39.99))]);

        let text = format_results(&offers, 4);
        assert!(text.contains("📅 Mon 15 Sep 2025"));
        assert!(text.contains("39.99 €"));
        assert!(text.contains("4 more not shown"));
    }

    #[test]
    fn test_unpriced_offer_renders_placeholder() {
        let mut offers = OffersByDate::new();
        offers.insert(NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(), vec![one_way(None)]);

        let text = format_results(&offers, 0);
        assert!(text.contains("price n/a"));
        assert!(!text.contains("more not shown"));
    }
}
